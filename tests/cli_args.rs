use clap::Parser;
use taskgraph::cli::{CliArgs, Command, ListOrder, LogLevel};
use taskgraph::logging::resolve_level;
use taskgraph::types::ErrorStrategy;

#[test]
fn test_add_arguments_parse() {
    let args = CliArgs::try_parse_from([
        "taskgraph",
        "--dir",
        "/tmp/wf",
        "add",
        "--title",
        "Write parser",
        "--priority",
        "-1",
        "--depends-on",
        "task-001",
        "--depends-on",
        "task-002",
        "--strategy",
        "escalate",
        "--criterion",
        "tests pass::cargo test",
    ])
    .unwrap();

    assert_eq!(args.dir.as_deref(), Some(std::path::Path::new("/tmp/wf")));
    match args.command {
        Command::Add(add) => {
            assert_eq!(add.title, "Write parser");
            assert_eq!(add.priority, Some(-1));
            assert_eq!(add.depends_on, vec!["task-001", "task-002"]);
            assert_eq!(add.strategy, Some(ErrorStrategy::Escalate));
            assert_eq!(add.criteria, vec!["tests pass::cargo test"]);
        }
        other => panic!("Expected add, got: {:?}", other),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let args =
        CliArgs::try_parse_from(["taskgraph", "list", "--order", "topo", "--log-level", "debug"])
            .unwrap();

    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert!(matches!(args.command, Command::List { order: ListOrder::Topo }));
}

#[test]
fn test_bad_strategy_is_rejected() {
    assert!(
        CliArgs::try_parse_from(["taskgraph", "add", "--title", "x", "--strategy", "ignore"])
            .is_err()
    );
}

#[test]
fn test_log_level_precedence() {
    assert_eq!(resolve_level(Some(LogLevel::Warn), Some("trace")), tracing::Level::WARN);
    assert_eq!(resolve_level(None, Some("DEBUG")), tracing::Level::DEBUG);
    assert_eq!(resolve_level(None, Some("chatty")), tracing::Level::INFO);
    assert_eq!(resolve_level(None, None), tracing::Level::INFO);
}

#[test]
fn test_retry_help_describes_moving_back_in_progress() {
    use clap::CommandFactory;

    let cmd = CliArgs::command();
    let retry = cmd
        .get_subcommands()
        .find(|c| c.get_name() == "retry")
        .unwrap();
    let about = retry.get_about().unwrap().to_string();
    assert!(about.contains("in progress"), "{about}");

    let args = CliArgs::try_parse_from(["taskgraph", "retry", "task-001"]).unwrap();
    assert!(matches!(args.command, Command::Retry { ref id } if id == "task-001"));
}
