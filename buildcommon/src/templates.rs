//! gcc command line conventions used by the compile and link rules
use crate::prelude::*;

use crate::env::BuildEnv;
use crate::step::ConfigurationStep;
use crate::system::Error;

/// Flags placed before the output (and input) of each rule
pub static TARGET_FLAGS: &[(&str, &[&str])] = &[
    ("CC_TGT_F", &["-c", "-o"]),
    ("CXX_TGT_F", &["-c", "-o"]),
    ("AS_TGT_F", &["-c", "-o"]),
    ("CCLNK_TGT_F", &["-o"]),
    ("CXXLNK_TGT_F", &["-o"]),
    ("ASLNK_TGT_F", &["-o"]),
];

/// Templates where `%s` is replaced by each value
pub static ARG_TEMPLATES: &[(&str, &str)] = &[
    ("CPPPATH_ST", "-I%s"),
    ("DEFINES_ST", "-D%s"),
    ("LIB_ST", "-l%s"),
    ("LIBPATH_ST", "-L%s"),
];

/// Step that records how to pass outputs, includes, defines and libraries to gcc
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandTemplates;

impl ConfigurationStep for CommandTemplates {
    fn name(&self) -> &'static str {
        "templates"
    }

    fn apply(&self, env: &mut BuildEnv) -> Result<(), Error> {
        for (var, flags) in TARGET_FLAGS {
            env.set_list(*var, flags.iter().copied());
        }
        for (var, template) in ARG_TEMPLATES {
            env.set(*var, *template);
        }
        verboseln!("installed gcc command templates");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates() {
        let mut env = BuildEnv::new();
        CommandTemplates.apply(&mut env).unwrap();
        assert_eq!(env.get_list("CC_TGT_F").unwrap(), ["-c", "-o"]);
        assert_eq!(env.get_list("CXXLNK_TGT_F").unwrap(), ["-o"]);
        assert_eq!(env.get_str("DEFINES_ST"), Some("-D%s"));
        assert_eq!(env.len(), TARGET_FLAGS.len() + ARG_TEMPLATES.len());
    }
}
