use libcli::cli::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared log of what handlers saw, in call order.
type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn take(log: &Log) -> Vec<String> {
    log.borrow_mut().drain(..).collect()
}

/// Handler that records `name arg=value ... rest...` and returns `result`.
fn recorder(log: &Log, result: bool) -> impl FnMut(&ParsedCommand) -> bool + 'static {
    let log = Rc::clone(log);
    move |cmd: &ParsedCommand| {
        let mut entry = cmd.name().to_string();
        for arg in cmd.args() {
            entry.push_str(&format!(" {}={}", arg.name(), arg.value()));
        }
        for word in cmd.rest() {
            entry.push(' ');
            entry.push_str(word);
        }
        log.borrow_mut().push(entry);
        result
    }
}

fn error_recorder(log: &Log) -> impl FnMut(&ParseError) + 'static {
    let log = Rc::clone(log);
    move |error: &ParseError| log.borrow_mut().push(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert!(!cli.is_paused());
        assert!(!cli.available());
        assert!(!cli.has_errors());
        assert_eq!(cli.count_queued_commands(), 0);
        assert_eq!(cli.count_queued_errors(), 0);
    }

    #[test]
    fn test_zero_argument_commands_match_their_name() {
        let mut cli = Cli::default();
        for name in ["ping", "status", "reset", "ls/list"] {
            cli.add_command(name, CommandMode::Default).unwrap();
        }

        for input in ["ping", "status", "reset", "ls", "list"] {
            assert!(cli.parse_str(input), "{input} should match");
        }
        assert!(!cli.has_errors());
        assert_eq!(cli.count_queued_commands(), 5);
        assert_eq!(cli.pop_command().unwrap().name(), "ping");
    }

    #[test]
    fn test_default_mode_argument_count() {
        let mut cli = Cli::default();
        let cmd = cli.add_command("cmd", CommandMode::Default).unwrap();
        cli.add_argument(cmd, "first", ArgKind::Positional, None).unwrap();
        cli.add_argument(cmd, "second", ArgKind::Positional, None).unwrap();

        assert!(!cli.parse(b"cmd a b c"));
        let error = cli.pop_error().unwrap();
        assert_eq!(error.kind(), ErrorKind::TooManyArguments);
        assert_eq!(error.token(), Some("c"));

        assert!(!cli.parse(b"cmd a"));
        let error = cli.pop_error().unwrap();
        assert_eq!(error.kind(), ErrorKind::MissingArgument);
        assert_eq!(error.argument(), Some("second"));

        assert!(cli.parse(b"cmd a b"));
        assert!(!cli.has_errors());
    }

    #[test]
    fn test_default_value_fills_missing_positional() {
        let mut cli = Cli::default();
        let cmd = cli.add_command("cmd", CommandMode::Default).unwrap();
        cli.add_argument(cmd, "first", ArgKind::Positional, None).unwrap();
        cli.add_argument(cmd, "second", ArgKind::Positional, Some("fallback"))
            .unwrap();

        assert!(cli.parse(b"cmd a"));
        let parsed = cli.pop_command().unwrap();
        assert_eq!(parsed.value("first"), Some("a"));
        assert_eq!(parsed.value("second"), Some("fallback"));
        assert!(!parsed.is_set("second"));
    }

    #[test]
    fn test_boundless_accepts_any_word_count() {
        let mut cli = Cli::default();
        cli.add_command("cmd", CommandMode::Boundless).unwrap();

        for count in 0..12 {
            let words: Vec<String> = (0..count).map(|i| format!("w{i}")).collect();
            let line = format!("cmd {}", words.join(" "));
            assert!(cli.parse_str(&line));

            let parsed = cli.pop_command().unwrap();
            assert_eq!(parsed.rest(), words.as_slice());
            assert_eq!(parsed.rest_joined(), words.join(" "));
        }
        assert!(!cli.has_errors());
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let mut cli = Cli::default();
        cli.add_command("Foo", CommandMode::Default).unwrap();

        assert!(cli.parse(b"foo"));
        assert!(cli.parse(b"FOO"));
        assert!(cli.parse(b"Foo"));
        assert_eq!(cli.count_queued_commands(), 3);
    }

    #[test]
    fn test_case_sensitive() {
        let mut cli = Cli::default();
        cli.add_command("Foo", CommandMode::Default).unwrap();
        cli.set_case_sensitive(true);

        assert!(cli.parse(b"Foo"));
        assert!(!cli.parse(b"foo"));
        assert!(!cli.parse(b"FOO"));
        assert_eq!(cli.count_queued_commands(), 1);
        assert_eq!(cli.count_queued_errors(), 2);
        assert_eq!(cli.pop_error().unwrap().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_per_command_case_override() {
        let mut cli = Cli::default();
        let strict = cli.add_command("Strict", CommandMode::Default).unwrap();
        cli.add_command("Loose", CommandMode::Default).unwrap();
        cli.set_command_case_sensitive(strict, true).unwrap();

        assert!(!cli.parse(b"strict"));
        assert!(cli.parse(b"loose"));
        assert_eq!(cli.find_command("STRICT"), None);
        assert!(cli.find_command("LOOSE").is_some());
    }

    #[test]
    fn test_handler_runs_immediately() {
        let log = new_log();
        let mut cli = Cli::default();
        let led = cli.add_command("led", CommandMode::Default).unwrap();
        cli.add_argument(led, "state", ArgKind::Positional, None).unwrap();
        cli.add_argument(led, "b/brightness", ArgKind::Named, Some("100"))
            .unwrap();
        cli.set_handler(led, recorder(&log, true)).unwrap();

        assert!(cli.parse(b"led on -b 40\nled off"));
        assert_eq!(
            take(&log),
            ["led state=on b/brightness=40", "led state=off b/brightness=100"]
        );
        assert!(!cli.available());
    }

    #[test]
    fn test_command_without_handler_is_queued() {
        let mut cli = Cli::default();
        let id = cli.add_command("status", CommandMode::Default).unwrap();

        assert!(cli.parse(b"status"));
        assert!(cli.available());
        let parsed = cli.pop_command().unwrap();
        assert_eq!(parsed.id(), id);
        assert!(cli.pop_command().is_none());
    }

    #[test]
    fn test_errors_go_to_handler() {
        let errors = new_log();
        let mut cli = Cli::default();
        cli.set_error_handler(error_recorder(&errors));

        assert!(!cli.parse(b"reboot"));
        assert_eq!(take(&errors), ["Command not found \"reboot\""]);
        assert!(!cli.has_errors());
    }

    #[test]
    fn test_later_lines_still_processed_after_error() {
        let log = new_log();
        let mut cli = Cli::default();
        let ping = cli.add_command("ping", CommandMode::Default).unwrap();
        cli.set_handler(ping, recorder(&log, true)).unwrap();

        assert!(!cli.parse(b"nope; ping; ping extra; ping"));
        assert_eq!(take(&log), ["ping", "ping"]);
        assert_eq!(cli.count_queued_errors(), 2);
        assert_eq!(cli.pop_error().unwrap().kind(), ErrorKind::NotFound);
        assert_eq!(
            cli.pop_error().unwrap().kind(),
            ErrorKind::TooManyArguments
        );
    }

    #[test]
    fn test_empty_input() {
        let mut cli = Cli::default();
        assert!(cli.parse(b""));
        assert!(cli.parse(b"   \r\n"));
        assert!(!cli.has_errors());
    }

    #[test]
    fn test_handler_failure_policy() {
        let log = new_log();
        let mut cli = Cli::default();
        let fail = cli.add_command("fail", CommandMode::Default).unwrap();
        cli.set_handler(fail, recorder(&log, false)).unwrap();

        // Failure makes parse return false but is not an error by default.
        assert!(!cli.parse(b"fail"));
        assert!(!cli.has_errors());

        cli.set_callback_failure_as_error(true);
        assert!(!cli.parse(b"fail"));
        let error = cli.pop_error().unwrap();
        assert_eq!(error.kind(), ErrorKind::CallbackFailure);
        assert_eq!(error.command(), Some("fail"));
        assert_eq!(take(&log).len(), 2);
    }

    #[test]
    fn test_command_queue_evicts_oldest() {
        let mut cli = Cli::new(3, 3);
        cli.add_command("n", CommandMode::Single).unwrap();

        for i in 0..4 {
            assert!(cli.parse_str(&format!("n {i}")));
        }
        assert_eq!(cli.count_queued_commands(), 3);
        assert_eq!(cli.dropped_commands(), 1);
        let kept: Vec<String> = std::iter::from_fn(|| cli.pop_command())
            .map(|cmd| cmd.rest_joined())
            .collect();
        assert_eq!(kept, ["1", "2", "3"]);
    }

    #[test]
    fn test_large_queues_hold_their_full_capacity() {
        let mut cli = Cli::new(40, 40);
        cli.add_command("n", CommandMode::Single).unwrap();

        for i in 0..41 {
            assert!(cli.parse_str(&format!("n {i}")));
            assert!(!cli.parse_str(&format!("bad{i}")));
        }
        assert_eq!(cli.count_queued_commands(), 40);
        assert_eq!(cli.dropped_commands(), 1);
        assert_eq!(cli.pop_command().unwrap().rest_joined(), "1");

        assert_eq!(cli.count_queued_errors(), 40);
        assert_eq!(cli.dropped_errors(), 1);
        assert_eq!(cli.pop_error().unwrap().token(), Some("bad1"));
    }

    #[test]
    fn test_error_queue_evicts_oldest() {
        let mut cli = Cli::new(2, 2);
        assert!(!cli.parse(b"a; b; c"));
        assert_eq!(cli.count_queued_errors(), 2);
        assert_eq!(cli.dropped_errors(), 1);
        assert_eq!(cli.pop_error().unwrap().token(), Some("b"));
        assert_eq!(cli.pop_error().unwrap().token(), Some("c"));
        assert!(cli.pop_error().is_none());
    }

    #[test]
    fn test_bound_values_round_trip() {
        let mut cli = Cli::default();
        let cfg = cli.add_command("config", CommandMode::Default).unwrap();
        cli.add_argument(cfg, "key", ArgKind::Positional, None).unwrap();
        cli.add_argument(cfg, "value", ArgKind::Positional, Some("none"))
            .unwrap();
        cli.add_argument(cfg, "persist", ArgKind::Flag, None).unwrap();

        assert!(cli.parse(b"config \"device name\" 'My Device' -persist"));
        let parsed = cli.pop_command().unwrap();
        assert_eq!(parsed.value("key"), Some("device name"));
        assert_eq!(parsed.value("value"), Some("My Device"));
        assert_eq!(parsed.value("persist"), Some(FLAG_SET_VALUE));
        assert_eq!(parsed.arg_at(0).unwrap().value(), "device name");
        assert_eq!(parsed.count_args(), 3);

        assert!(cli.parse(b"config hostname"));
        let parsed = cli.pop_command().unwrap();
        assert_eq!(parsed.value("value"), Some("none"));
        assert!(!parsed.is_set("persist"));
        assert_eq!(parsed.value("persist"), Some(""));
    }

    #[test]
    fn test_queued_commands_are_detached() {
        let mut cli = Cli::default();
        let echo = cli.add_command("echo", CommandMode::Default).unwrap();
        cli.add_argument(echo, "text", ArgKind::Positional, Some("-"))
            .unwrap();

        assert!(cli.parse(b"echo first; echo"));
        let first = cli.pop_command().unwrap();
        let second = cli.pop_command().unwrap();
        assert_eq!(first.value("text"), Some("first"));
        assert!(first.is_set("text"));
        assert_eq!(second.value("text"), Some("-"));
        assert!(!second.is_set("text"));
    }

    #[test]
    fn test_registration_errors() {
        let mut cli = Cli::default();
        assert_eq!(
            cli.add_command("", CommandMode::Default),
            Err(Error::InvalidName)
        );
        let plain = cli.add_command("plain", CommandMode::Default).unwrap();
        assert_eq!(
            cli.add_sub_command(plain, "child", CommandMode::Default),
            Err(Error::NotComposite)
        );
        cli.add_argument(plain, "x", ArgKind::Named, None).unwrap();
        assert_eq!(
            cli.add_argument(plain, "x", ArgKind::Positional, None),
            Err(Error::DuplicateArgument)
        );
    }

    #[test]
    fn test_display_lists_commands() {
        let mut cli = Cli::default();
        let cp = cli.add_command("cp", CommandMode::Default).unwrap();
        cli.add_argument(cp, "src", ArgKind::Positional, None).unwrap();
        cli.add_argument(cp, "dst", ArgKind::Positional, Some(".")).unwrap();
        cli.add_argument(cp, "m/mode", ArgKind::Named, Some("copy")).unwrap();
        cli.add_argument(cp, "user", ArgKind::Named, None).unwrap();
        cli.add_argument(cp, "v", ArgKind::Flag, None).unwrap();
        let echo = cli.add_command("echo", CommandMode::Boundless).unwrap();
        cli.set_description(echo, "Print the arguments").unwrap();
        cli.add_command("say", CommandMode::Single).unwrap();
        let net = cli.add_composite("net").unwrap();
        let up = cli.add_sub_command(net, "up", CommandMode::Default).unwrap();
        cli.add_argument(up, "iface", ArgKind::Positional, None).unwrap();

        assert_eq!(
            cli.to_string(),
            concat!(
                "cp <src> [<dst>] [-m/mode <copy>] -user <value> [-v]\r\n",
                "echo (boundless)\r\n",
                "  Print the arguments\r\n",
                "say (single)\r\n",
                "net (composite)\r\n",
                "  up <iface>\r\n",
            )
        );
    }

    #[test]
    fn test_command_lookup() {
        let mut cli = Cli::default();
        let id = cli.add_command("reset", CommandMode::Default).unwrap();
        cli.set_description(id, "Reset the system").unwrap();

        let command = cli.command(id).unwrap();
        assert_eq!(command.name(), "reset");
        assert_eq!(command.description(), Some("Reset the system"));
        assert!(!command.has_handler());
        assert_eq!(cli.find_command("reset"), Some(id));
        assert_eq!(cli.registry().len(), 1);
    }

    #[test]
    fn test_parse_error_display() {
        let mut cli = Cli::default();
        let cp = cli.add_command("cp", CommandMode::Default).unwrap();
        cli.add_argument(cp, "m/mode", ArgKind::Named, None).unwrap();

        assert!(!cli.parse(b"cp -m"));
        let error = cli.pop_error().unwrap();
        assert_eq!(error.to_string(), "Missing argument value \"-m\" -m (cp)");
        assert_eq!(error.message(), "Missing argument value");
    }
}
