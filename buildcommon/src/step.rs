//! Configuration steps and the pipeline that runs them
use crate::prelude::*;

use crate::env::BuildEnv;
use crate::system::Error;

/// One unit of configuration that writes into the build environment
pub trait ConfigurationStep {
    /// Name for logging and error reports
    fn name(&self) -> &'static str;

    /// Apply the step to the environment
    ///
    /// On error, the step must not leave a partially written environment
    /// that looks like a success; the pipeline aborts either way.
    fn apply(&self, env: &mut BuildEnv) -> Result<(), Error>;
}

/// Ordered list of steps applied to one environment
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn ConfigurationStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step to the end of the pipeline
    pub fn step(mut self, step: impl ConfigurationStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Names of the steps in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order on a fresh environment
    ///
    /// Stops at the first failing step
    pub fn run(&self) -> Result<BuildEnv, Error> {
        let mut env = BuildEnv::new();
        self.run_on(&mut env)?;
        Ok(env)
    }

    /// Run every step in order on an existing environment
    pub fn run_on(&self, env: &mut BuildEnv) -> Result<(), Error> {
        for step in &self.steps {
            verboseln!("step: {}", step.name());
            step.apply(env)
                .attach_printable_lazy(|| format!("in configuration step `{}`", step.name()))
                .change_context(Error::Step(step.name()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    struct Record {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
        fail: bool,
    }

    impl ConfigurationStep for Record {
        fn name(&self) -> &'static str {
            self.name
        }
        fn apply(&self, env: &mut BuildEnv) -> Result<(), Error> {
            self.log.borrow_mut().push(self.name);
            if self.fail {
                return Err(report!(Error::ToolNotFound("missing-tool".to_string())));
            }
            env.set("LAST", self.name);
            Ok(())
        }
    }

    fn record(name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>, fail: bool) -> Record {
        Record {
            name,
            log: Rc::clone(log),
            fail,
        }
    }

    #[test]
    fn test_runs_in_order() {
        let log = Rc::new(RefCell::new(vec![]));
        let pipeline = Pipeline::new()
            .step(record("flags", &log, false))
            .step(record("toolchain", &log, false));
        assert_eq!(pipeline.names(), ["flags", "toolchain"]);

        let env = pipeline.run().unwrap();
        assert_eq!(*log.borrow(), ["flags", "toolchain"]);
        // later writers win
        assert_eq!(env.get_str("LAST"), Some("toolchain"));
    }

    #[test]
    fn test_stops_at_failure() {
        let log = Rc::new(RefCell::new(vec![]));
        let pipeline = Pipeline::new()
            .step(record("flags", &log, false))
            .step(record("toolchain", &log, true))
            .step(record("templates", &log, false));

        let err = pipeline.run().unwrap_err();
        assert!(matches!(err.current_context(), Error::Step("toolchain")));
        let missing = err
            .frames()
            .find_map(|f| f.downcast_ref::<Error>().filter(|e| matches!(e, Error::ToolNotFound(_))));
        assert!(missing.is_some());
        assert_eq!(*log.borrow(), ["flags", "toolchain"]);
    }
}
