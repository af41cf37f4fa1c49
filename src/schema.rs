//! Option Schema - Named String Options in Definition Order
//!
//! The schema is the single store for option values. Typed accessors keep an
//! [`OptionRef`] and read through it; serialization and validation iterate
//! the same store. Definition order is preserved because it fixes the order
//! of flags on the compiler command line.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
}

/// Handle to an option, returned by [`ConfigSchema::define`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRef(usize);

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigOption {
    pub name: String,
    pub value: String,
    pub default: String,
    pub usage: String,
}

#[derive(Debug, Clone)]
pub struct ConfigSchema {
    name: String,
    options: Vec<ConfigOption>,
}

impl ConfigSchema {
    /// Empty option set; `name` heads the usage text
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Name of the option set
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an option whose current value starts out as `default`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already defined. Option sets are declared in code,
    /// so a duplicate is a bug in the declaration, not a runtime condition.
    pub fn define(
        &mut self,
        name: &str,
        default: impl Into<String>,
        usage: &str,
    ) -> OptionRef {
        if self.position(name).is_some() {
            panic!("{} flag redefined: {}", self.name, name);
        }

        let default = default.into();
        self.options.push(ConfigOption {
            name: name.to_string(),
            value: default.clone(),
            default,
            usage: usage.to_string(),
        });
        OptionRef(self.options.len() - 1)
    }

    /// Current value behind a handle from this schema.
    ///
    /// # Panics
    ///
    /// Panics if `option` came from a schema with fewer options.
    pub(crate) fn value(&self, option: OptionRef) -> &str {
        &self.options[option.0].value
    }

    /// Current value of `name`, `None` if it was never defined
    pub fn get(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|o| o.value.as_str())
    }

    /// Full option entry: value, default and usage
    pub fn lookup(&self, name: &str) -> Option<&ConfigOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Overwrite the current value of a defined option
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), FlagError> {
        let idx = self
            .position(name)
            .ok_or_else(|| FlagError::UnknownFlag(name.to_string()))?;
        let value = value.into();
        tracing::debug!(flag = name, value = %value, "option overridden");
        self.options[idx].value = value;
        Ok(())
    }

    /// Call `f(name, value)` for every option, in definition order
    pub fn visit_all<F>(&self, mut f: F)
    where
        F: FnMut(&str, &str),
    {
        for option in &self.options {
            f(&option.name, &option.value);
        }
    }

    /// All options, in definition order
    pub fn options(&self) -> &[ConfigOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Apply flag-style overrides and return the arguments left after them.
    ///
    /// Accepts `-name=value`, `--name=value`, `-name value` and
    /// `--name value`. Stops at the first non-flag argument or after `--`.
    pub fn parse<I, S>(&mut self, args: I) -> Result<Vec<String>, FlagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter().map(|a| a.as_ref().to_string());
        let mut rest = Vec::new();

        while let Some(arg) = args.next() {
            if arg == "--" {
                break;
            }
            if arg.len() < 2 || !arg.starts_with('-') {
                rest.push(arg);
                break;
            }

            let body = arg.strip_prefix("--").unwrap_or_else(|| &arg[1..]);
            if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
                return Err(FlagError::BadSyntax(arg));
            }

            let (name, value) = match body.split_once('=') {
                Some((name, value)) => (name.to_string(), value.to_string()),
                None => {
                    let name = body.to_string();
                    if self.position(&name).is_none() {
                        return Err(FlagError::UnknownFlag(name));
                    }
                    match args.next() {
                        Some(value) => (name, value),
                        None => return Err(FlagError::MissingValue(name)),
                    }
                }
            };

            self.set(&name, value)?;
        }

        rest.extend(args);
        Ok(rest)
    }

    /// Usage text listing every option with its description and default
    pub fn usage(&self) -> String {
        let mut out = format!("Usage of {}:\n", self.name);
        for option in &self.options {
            out.push_str(&format!("  -{} string\n    \t{}", option.name, option.usage));
            if !option.default.is_empty() {
                out.push_str(&format!(" (default \"{}\")", option.default));
            }
            out.push('\n');
        }
        out
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|o| o.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ConfigSchema {
        let mut s = ConfigSchema::new("test");
        s.define("alpha", "a", "first option");
        s.define("beta", "", "second option");
        s.define("gamma", "g", "third option");
        s
    }

    #[test]
    fn test_define_sets_default_as_value() {
        let mut s = ConfigSchema::new("test");
        let alpha = s.define("alpha", "a", "first option");
        assert_eq!(s.value(alpha), "a");
        assert_eq!(s.get("alpha"), Some("a"));
        assert_eq!(s.lookup("alpha").unwrap().default, "a");
    }

    #[test]
    #[should_panic(expected = "flag redefined: alpha")]
    fn test_duplicate_define_panics() {
        let mut s = schema();
        s.define("alpha", "again", "dup");
    }

    #[test]
    #[should_panic]
    fn test_value_with_ref_from_larger_schema_panics() {
        let mut big = schema();
        let delta = big.define("delta", "d", "fourth option");
        let small = ConfigSchema::new("small");
        small.value(delta);
    }

    #[test]
    fn test_get_unknown_is_none() {
        assert_eq!(schema().get("delta"), None);
    }

    #[test]
    fn test_visit_all_in_definition_order() {
        let s = schema();
        let mut seen = vec![];
        s.visit_all(|name, value| seen.push(format!("{}={}", name, value)));
        assert_eq!(seen, vec!["alpha=a", "beta=", "gamma=g"]);
    }

    #[test]
    fn test_set_writes_through_ref() {
        let mut s = ConfigSchema::new("test");
        let alpha = s.define("alpha", "a", "first option");
        s.set("alpha", "changed").unwrap();
        assert_eq!(s.value(alpha), "changed");
        assert_eq!(s.lookup("alpha").unwrap().default, "a");
    }

    #[test]
    fn test_set_unknown_fails() {
        let mut s = schema();
        assert_eq!(
            s.set("delta", "x"),
            Err(FlagError::UnknownFlag("delta".to_string()))
        );
    }

    #[test]
    fn test_parse_accepts_all_forms() {
        let mut s = schema();
        let rest = s
            .parse(["-alpha=1", "--beta", "2", "--gamma=x=y"])
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(s.get("alpha"), Some("1"));
        assert_eq!(s.get("beta"), Some("2"));
        assert_eq!(s.get("gamma"), Some("x=y"));
    }

    #[test]
    fn test_parse_quoted_empty_value() {
        let mut s = schema();
        s.parse(["-alpha="]).unwrap();
        assert_eq!(s.get("alpha"), Some(""));
    }

    #[test]
    fn test_parse_stops_at_positional_and_terminator() {
        let mut s = schema();
        let rest = s.parse(["-alpha=1", "extra", "-beta=2"]).unwrap();
        assert_eq!(rest, vec!["extra", "-beta=2"]);
        assert_eq!(s.get("beta"), Some(""));

        let rest = s.parse(["--", "-gamma=z"]).unwrap();
        assert_eq!(rest, vec!["-gamma=z"]);
        assert_eq!(s.get("gamma"), Some("g"));

        let rest = s.parse(["-"]).unwrap();
        assert_eq!(rest, vec!["-"]);
    }

    #[test]
    fn test_parse_errors() {
        let mut s = schema();
        assert_eq!(
            s.parse(["-delta=1"]),
            Err(FlagError::UnknownFlag("delta".to_string()))
        );
        assert_eq!(
            s.parse(["-alpha"]),
            Err(FlagError::MissingValue("alpha".to_string()))
        );
        assert_eq!(
            s.parse(["---alpha=1"]),
            Err(FlagError::BadSyntax("---alpha=1".to_string()))
        );
        assert_eq!(
            s.parse(["-=1"]),
            Err(FlagError::BadSyntax("-=1".to_string()))
        );
    }

    #[test]
    fn test_usage_lists_options_with_defaults() {
        let usage = schema().usage();
        assert!(usage.starts_with("Usage of test:\n"));
        assert!(usage.contains("  -alpha string\n    \tfirst option (default \"a\")\n"));
        assert!(usage.contains("  -beta string\n    \tsecond option\n"));
        assert!(usage.find("-alpha").unwrap() < usage.find("-gamma").unwrap());
    }

    #[test]
    fn test_options_serialize_to_json() {
        let json = serde_json::to_value(schema().options()).unwrap();
        assert_eq!(json[0]["name"], "alpha");
        assert_eq!(json[0]["value"], "a");
        assert_eq!(json[1]["usage"], "second option");
    }
}
