use edit_command::{
    ActionCandidate, BatchExecutor, Command, CommandKind, Conflict, OptionValue, Severity,
    TextRange, Workspace,
};
use pretty_assertions::assert_eq;

fn option(name: &str, value: i64) -> Command {
    Command::UpdateOption {
        name: name.to_string(),
        value: OptionValue::Int(value),
    }
}

#[test]
fn test_nothing_is_identity() {
    let cmds = [
        option("a", 1),
        Command::info("hello"),
        option("a", 1).and_then(option("b", 2)),
    ];
    for cmd in cmds {
        assert_eq!(cmd.clone().and_then(Command::nothing()), cmd);
        assert_eq!(Command::nothing().and_then(cmd.clone()), cmd);
    }
    assert_eq!(Command::nothing().and_then(Command::nothing()), Command::Nothing);
}

#[test]
fn test_and_then_is_associative() {
    let a = option("a", 1);
    let b = option("b", 2).and_then(option("c", 3));
    let c = option("d", 4);

    let left = a.clone().and_then(b.clone()).and_then(c.clone());
    let right = a.and_then(b.and_then(c));

    assert_eq!(left, right);
    let names: Vec<&str> = left
        .steps()
        .map(|step| match step {
            Command::UpdateOption { name, .. } => name.as_str(),
            other => panic!("unexpected step {other:?}"),
        })
        .collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_associativity_is_observable() {
    let a = option("x", 1);
    let b = option("x", 2);
    let c = option("y", 3);

    let mut left_ws = Workspace::new();
    let mut right_ws = Workspace::new();
    BatchExecutor::new(&mut left_ws)
        .execute(&a.clone().and_then(b.clone()).and_then(c.clone()))
        .unwrap();
    BatchExecutor::new(&mut right_ws)
        .execute(&a.and_then(b.and_then(c)))
        .unwrap();

    assert_eq!(left_ws.option("x"), right_ws.option("x"));
    assert_eq!(left_ws.option("x"), Some(&OptionValue::Int(2)));
    assert_eq!(left_ws.option("y"), right_ws.option("y"));
}

#[test]
fn test_sequence_skips_nothing() {
    let cmd = Command::sequence([
        Command::Nothing,
        option("a", 1),
        Command::Nothing,
        option("b", 2),
    ]);
    assert_eq!(cmd, Command::Composite(vec![option("a", 1), option("b", 2)]));
    assert!(Command::sequence(Vec::new()).is_nothing());
}

#[test]
fn test_commands_are_introspectable() {
    let mut ws = Workspace::new();
    let doc = ws.open_document(ws.root(), "a.rs", "abc").unwrap();

    let cmd = Command::ShowConflicts {
        conflicts: vec![Conflict {
            file: Some(doc),
            range: Some(TextRange::new(0, 1)),
            message: "shadows an existing binding".to_string(),
        }],
        next: Box::new(Command::ChooseAction {
            title: "Pick".to_string(),
            candidates: vec![ActionCandidate::new("one", option("a", 1))],
        }),
    };

    assert_eq!(cmd.kind(), CommandKind::ShowConflicts);
    assert_eq!(cmd.kind().to_string(), "show_conflicts");

    let value = serde_json::to_value(&cmd).unwrap();
    assert_eq!(value["kind"], "show_conflicts");
    assert_eq!(value["data"]["conflicts"][0]["message"], "shadows an existing binding");
    assert_eq!(value["data"]["next"]["kind"], "choose_action");
    assert_eq!(
        value["data"]["next"]["data"]["candidates"][0]["label"],
        "one"
    );
}

#[test]
fn test_message_constructors() {
    assert_eq!(
        Command::error("boom"),
        Command::DisplayMessage {
            severity: Severity::Error,
            message: "boom".to_string()
        }
    );
    assert_eq!(
        Command::info("fyi"),
        Command::DisplayMessage {
            severity: Severity::Info,
            message: "fyi".to_string()
        }
    );
}

#[test]
fn test_commands_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Command>();
}

#[test]
fn test_empty_composite_is_identity() {
    let empty = Command::Composite(Vec::new());
    assert!(empty.is_nothing());

    assert_eq!(empty.clone().and_then(option("a", 1)), option("a", 1));
    assert_eq!(option("a", 1).and_then(empty.clone()), option("a", 1));
    assert_eq!(
        Command::Composite(vec![Command::Nothing, Command::Composite(Vec::new())])
            .and_then(option("b", 2)),
        option("b", 2)
    );
    assert_eq!(empty.clone().and_then(empty), Command::Nothing);
}
