//! Extensions compiled into the host
//!
//! An artifact selects one of these with `new: {builtin: <name>}`.

pub mod env;
pub mod gocheck;

use super::Extension;

type BuiltinFactory = fn() -> Box<dyn Extension>;

const BUILTINS: &[(&str, BuiltinFactory)] = &[("env", new_env), ("gocheck", new_gocheck)];

fn new_env() -> Box<dyn Extension> {
    Box::new(env::EnvGuard)
}

fn new_gocheck() -> Box<dyn Extension> {
    Box::new(gocheck::GoCheck::default())
}

/// Look up a builtin factory by name
pub fn factory(name: &str) -> Option<BuiltinFactory> {
    BUILTINS.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(n, _)| *n)
}
