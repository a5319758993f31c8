//! Config facade tests
//!
//! Tests for option registration, prompt-on-miss, batch mode and the
//! facade's lifecycle over durable backends.

use confvault::backend::{Backend, FlatFileBackend, MemoryBackend, StructuredBackend};
use confvault::config::{Config, OptionSpec, ScriptedPrompter};
use confvault::{ConfVaultError, Value, ValueKind};
use tempfile::TempDir;

fn interactive(answers: &[&str]) -> (Config, ScriptedPrompter) {
    let prompter = ScriptedPrompter::new(answers.iter().copied());
    (Config::memory().with_prompter(prompter.clone()), prompter)
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_prompted_port() {
        let (mut cfg, _) = interactive(&["8080"]);
        cfg.add_option(
            OptionSpec::new("port")
                .kind(ValueKind::Int)
                .choices(vec![80, 8080, 443]),
        )
        .unwrap();

        assert_eq!(cfg.get("port").unwrap(), Value::Int(8080));
    }

    #[test]
    fn test_batch_mode_cannot_prompt() {
        let mut cfg = Config::memory().with_batch(true);
        cfg.add_option(OptionSpec::new("name").kind(ValueKind::Str))
            .unwrap();

        let err = cfg.get("name").unwrap_err();
        assert!(matches!(
            err,
            ConfVaultError::BatchModeUnableToPrompt { ref key } if key == "name"
        ));
    }

    #[test]
    fn test_invalid_answers_never_returned() {
        let (mut cfg, prompter) = interactive(&["22", "21", "23", "25", "80"]);
        cfg.add_option(
            OptionSpec::new("port")
                .kind(ValueKind::Int)
                .choices(vec![80, 8080, 443])
                .retries(3),
        )
        .unwrap();

        assert!(matches!(
            cfg.get("port"),
            Err(ConfVaultError::TooManyRetries { attempts: 4, .. })
        ));
        assert_eq!(prompter.prompts().len(), 4);
        assert!(!cfg.contains("port").unwrap());
    }

    #[test]
    fn test_each_prompt_has_its_own_budget() {
        let (mut cfg, _) = interactive(&["x", "x", "1", "y", "y", "y", "2"]);
        cfg.add_option(OptionSpec::new("a").kind(ValueKind::Int))
            .unwrap();
        cfg.add_option(OptionSpec::new("b").kind(ValueKind::Int))
            .unwrap();

        assert_eq!(cfg.get("a").unwrap(), Value::Int(1));
        assert_eq!(cfg.get("b").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_empty_answer_takes_default() {
        let (mut cfg, prompter) = interactive(&[""]);
        cfg.add_option(
            OptionSpec::new("mode")
                .choices(vec!["fast", "safe"])
                .default("safe")
                .help("How to run"),
        )
        .unwrap();

        assert_eq!(cfg.get("mode").unwrap(), Value::from("safe"));
        assert_eq!(prompter.prompts(), vec!["mode [fast, safe] (safe)".to_string()]);
        assert!(prompter.notices()[0].contains("How to run"));
    }
}

#[cfg(test)]
mod option_validation_tests {
    use super::*;

    #[test]
    fn test_default_must_match_type() {
        let mut cfg = Config::memory();
        let cases = vec![
            OptionSpec::new("k").kind(ValueKind::Float).default(354),
            OptionSpec::new("k").kind(ValueKind::Int).default(3.5),
            OptionSpec::new("k").kind(ValueKind::Str).default(1),
            OptionSpec::new("k").kind(ValueKind::Bool).default("true"),
            OptionSpec::new("k").kind(ValueKind::List).default("a,b"),
        ];

        for spec in cases {
            assert!(matches!(
                cfg.add_option(spec),
                Err(ConfVaultError::IllegalArgument(_))
            ));
        }
        assert!(cfg.options().is_empty());
    }

    #[test]
    fn test_matching_defaults_accepted() {
        let mut cfg = Config::memory();
        cfg.add_option(OptionSpec::new("f").kind(ValueKind::Float).default(354.0))
            .unwrap();
        cfg.add_option(OptionSpec::new("b").type_name("bool").default(false))
            .unwrap();
        cfg.add_option(OptionSpec::new("l").kind(ValueKind::List).default(vec!["a", "b"]))
            .unwrap();
        assert_eq!(cfg.options().len(), 3);
    }

    #[test]
    fn test_scalar_choices_are_type_errors() {
        let mut cfg = Config::memory();
        let err = cfg
            .add_option(OptionSpec::new("k").kind(ValueKind::Int).choices(234))
            .unwrap_err();
        assert!(matches!(err, ConfVaultError::TypeMismatch(_)));
    }

    #[test]
    fn test_string_choices_are_rejected() {
        let mut cfg = Config::memory();
        let err = cfg
            .add_option(OptionSpec::new("k").choices("BadChoice"))
            .unwrap_err();
        assert!(matches!(err, ConfVaultError::IllegalArgument(_)));
    }

    #[test]
    fn test_choice_items_must_match_type() {
        let mut cfg = Config::memory();
        let err = cfg
            .add_option(
                OptionSpec::new("k")
                    .kind(ValueKind::Int)
                    .choices(vec![Value::Int(1), Value::from("two")]),
            )
            .unwrap_err();
        assert!(matches!(err, ConfVaultError::IllegalArgument(_)));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut cfg = Config::memory();
        assert!(matches!(
            cfg.add_option(OptionSpec::new("k").type_name("complex")),
            Err(ConfVaultError::IllegalArgument(_))
        ));
        for name in ["int", "float", "str", "bool", "list", "bytes", "integer", "string"] {
            cfg.add_option(OptionSpec::new("k").type_name(name)).unwrap();
        }
    }
}

#[cfg(test)]
mod facade_tests {
    use super::*;

    #[test]
    fn test_batch_mode_toggle() {
        let (mut cfg, _) = interactive(&["prompted"]);
        cfg.add_option(OptionSpec::new("with_default").default("d"))
            .unwrap();
        cfg.add_option(OptionSpec::new("without_default"))
            .unwrap();

        cfg.enable_batch();
        assert_eq!(cfg.get("with_default").unwrap(), Value::from("d"));
        assert!(cfg.get("without_default").is_err());

        cfg.disable_batch();
        assert!(!cfg.is_batch());
        assert_eq!(cfg.get("without_default").unwrap(), Value::from("prompted"));
    }

    #[test]
    fn test_explicit_default_wins_over_option() {
        let (mut cfg, prompter) = interactive(&[]);
        cfg.add_option(OptionSpec::new("name").default("from-option"))
            .unwrap();
        assert_eq!(cfg.get_or("name", "explicit").unwrap(), Value::from("explicit"));
        assert!(prompter.prompts().is_empty());
    }

    #[test]
    fn test_sweep_prompts_only_missing_keys() {
        let (mut cfg, prompter) = interactive(&["1", "2"]);
        for name in ["host", "port", "user"] {
            cfg.add_option(OptionSpec::new(name)).unwrap();
        }
        cfg.set("port", "22").unwrap();

        assert_eq!(cfg.prompt().unwrap(), 2);
        assert_eq!(prompter.prompts(), vec!["host".to_string(), "user".to_string()]);
        assert_eq!(cfg.get("port").unwrap(), Value::from("22"));
    }

    #[test]
    fn test_shared_backend_across_configs() {
        let mut backend = MemoryBackend::new();
        {
            let mut first = Config::new(&mut backend);
            first.set("shared", 1).unwrap();
        }
        {
            let mut second = Config::new(&mut backend).with_batch(true);
            assert_eq!(second.get("shared").unwrap(), Value::Int(1));
            second.delete("shared").unwrap();
        }
        assert!(backend.is_empty().unwrap());
    }

    #[test]
    fn test_file_backed_config_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.cfg");

        let mut cfg = Config::new(FlatFileBackend::open(&path).unwrap()).with_batch(true);
        cfg.add_option(OptionSpec::new("retries").kind(ValueKind::Int).default(5))
            .unwrap();
        assert_eq!(cfg.get("retries").unwrap(), Value::Int(5));
        assert!(cfg.sync().unwrap());
        assert!(cfg.close().unwrap());

        let cfg = Config::new(FlatFileBackend::open(&path).unwrap());
        assert_eq!(cfg.try_get("retries").unwrap(), Some(Value::from("5")));
    }

    #[test]
    fn test_last_modified_from_signed_backend() {
        let dir = TempDir::new().unwrap();
        let backend = StructuredBackend::open_signed(dir.path().join("s.json")).unwrap();
        let mut cfg = Config::new(backend);
        cfg.set("k", "v").unwrap();

        let stamped = cfg.backend().entries()[0].timestamp;
        assert_eq!(cfg.last_modified("k").unwrap(), stamped);
        assert!(cfg.last_modified("missing").unwrap_err().is_key_not_found());
    }

    #[test]
    fn test_runtime_selected_backend() {
        let backend: Box<dyn Backend> = Box::new(MemoryBackend::new());
        let mut cfg = Config::new(backend);
        cfg.set("k", true).unwrap();
        assert_eq!(cfg.items().unwrap(), vec![("k".to_string(), Value::Bool(true))]);
        assert_eq!(cfg.into_backend().kind(), "memory");
    }
}
