use edit_command::{
    ActionCandidate, Command, Conflict, Continuation, DocumentId, EditorUi, ExecuteError,
    ExecutionRegistry, ExecutionState, ExecutorConfig, Highlight, HighlightStyle,
    InteractiveExecution, MutationSession, OptionValue, RenameRequest, Severity, Suspension,
    Template, TemplateExpansion, TemplateOutcome, TextRange, UserInput, Workspace,
};
use pretty_assertions::assert_eq;

/// Records every UI call as a line of text.
#[derive(Default)]
struct RecordingUi {
    calls: Vec<String>,
}

impl EditorUi for RecordingUi {
    fn open_document(&mut self, file: DocumentId, caret: usize, selection: Option<TextRange>) {
        self.calls.push(format!("open {file} {caret} {selection:?}"));
    }

    fn show_message(&mut self, severity: Severity, message: &str) {
        self.calls.push(format!("message {severity:?} {message}"));
    }

    fn highlight(&mut self, file: DocumentId, highlights: &[Highlight]) {
        self.calls.push(format!("highlight {file} {}", highlights.len()));
    }

    fn start_rename(&mut self, request: &RenameRequest) {
        self.calls.push(format!("rename {} {}", request.file, request.name_range));
    }

    fn start_template(&mut self, file: DocumentId, offset: usize, expansion: &TemplateExpansion) {
        self.calls.push(format!("template {file} {offset} {}", expansion.text));
    }

    fn show_conflicts(&mut self, conflicts: &[Conflict]) {
        self.calls.push(format!("conflicts {}", conflicts.len()));
    }

    fn show_choices(&mut self, title: &str, labels: &[String]) {
        self.calls.push(format!("choices {title} {}", labels.join(",")));
    }
}

fn set(name: &str, value: i64) -> Command {
    Command::UpdateOption {
        name: name.to_string(),
        value: OptionValue::Int(value),
    }
}

#[test]
fn test_session_command_runs_to_completion() {
    let mut ws = Workspace::new();
    let doc = ws.open_document(ws.root(), "a.rs", "let x = 1;").unwrap();
    let cmd = {
        let mut session = MutationSession::new(&ws, doc);
        session.replace(doc, TextRange::new(8, 9), "42").unwrap();
        session.select(TextRange::new(8, 10)).unwrap();
        session.highlight(TextRange::new(4, 5), HighlightStyle::Write).unwrap();
        session.into_command().unwrap()
    };
    let mut ui = RecordingUi::default();

    let mut execution = InteractiveExecution::new(cmd);
    let state = execution.run(&mut ws, &mut ui).unwrap().clone();

    assert_eq!(state, ExecutionState::Completed);
    assert_eq!(ws.document_text(doc).unwrap(), "let x = 42;");
    assert_eq!(ws.selection(doc).unwrap(), Some(TextRange::new(8, 10)));
    assert_eq!(
        ui.calls,
        vec![
            format!("open {doc} 10 Some(TextRange {{ start: 8, end: 10 }})"),
            format!("highlight {doc} 1"),
        ]
    );
}

#[test]
fn test_choice_suspends_and_resumes_with_tail() {
    let mut ws = Workspace::new();
    let choice = Command::ChooseAction {
        title: "Fix".to_string(),
        candidates: vec![
            ActionCandidate::new("first", set("picked", 1)),
            ActionCandidate::new("second", set("picked", 2)),
        ],
    };
    let cmd = set("before", 1).and_then(choice).and_then(set("after", 1));
    let mut ui = RecordingUi::default();

    let mut execution = InteractiveExecution::new(cmd);
    let state = execution.run(&mut ws, &mut ui).unwrap();
    assert!(matches!(
        state,
        ExecutionState::AwaitingUser(Suspension::Choice { .. })
    ));
    assert_eq!(execution.tail(), set("after", 1));
    assert_eq!(ws.option("before"), Some(&OptionValue::Int(1)));
    assert_eq!(ws.option("after"), None);

    // An answer that does not fit the suspension leaves it in place.
    assert!(matches!(
        execution.resume(UserInput::ConfirmConflicts(true), &mut ws, &mut ui),
        Err(ExecuteError::InvalidResume(_))
    ));
    assert!(matches!(
        execution.resume(UserInput::Choose(5), &mut ws, &mut ui),
        Err(ExecuteError::InvalidResume(_))
    ));

    let state = execution
        .resume(UserInput::Choose(1), &mut ws, &mut ui)
        .unwrap();
    assert_eq!(state, &ExecutionState::Completed);
    assert_eq!(ws.option("picked"), Some(&OptionValue::Int(2)));
    assert_eq!(ws.option("after"), Some(&OptionValue::Int(1)));
    assert_eq!(ui.calls, vec!["choices Fix first,second".to_string()]);
}

#[test]
fn test_single_candidate_runs_without_asking() {
    let mut ws = Workspace::new();
    let cmd = Command::ChooseAction {
        title: "Fix".to_string(),
        candidates: vec![ActionCandidate::new("only", set("picked", 7))],
    };
    let mut ui = RecordingUi::default();

    let mut execution = InteractiveExecution::new(cmd);
    assert_eq!(
        execution.run(&mut ws, &mut ui).unwrap(),
        &ExecutionState::Completed
    );
    assert_eq!(ws.option("picked"), Some(&OptionValue::Int(7)));
    assert!(ui.calls.is_empty());
}

#[test]
fn test_conflicts_confirmed_and_declined() {
    let conflicts = vec![Conflict {
        file: None,
        range: None,
        message: "name already used".to_string(),
    }];
    let cmd = Command::ShowConflicts {
        conflicts,
        next: Box::new(set("applied", 1)),
    };

    let mut ws = Workspace::new();
    let mut ui = RecordingUi::default();
    let mut confirmed = InteractiveExecution::new(cmd.clone());
    confirmed.run(&mut ws, &mut ui).unwrap();
    confirmed
        .resume(UserInput::ConfirmConflicts(true), &mut ws, &mut ui)
        .unwrap();
    assert_eq!(confirmed.state(), &ExecutionState::Completed);
    assert_eq!(ws.option("applied"), Some(&OptionValue::Int(1)));

    let mut ws = Workspace::new();
    let config = ExecutorConfig {
        cancelled_conflicts_message: "Refactoring cancelled".to_string(),
        ..ExecutorConfig::default()
    };
    let mut declined = InteractiveExecution::with_config(cmd, config);
    declined.run(&mut ws, &mut ui).unwrap();
    declined
        .resume(UserInput::ConfirmConflicts(false), &mut ws, &mut ui)
        .unwrap();
    assert_eq!(
        declined.state(),
        &ExecutionState::Aborted {
            reason: "Refactoring cancelled".to_string()
        }
    );
    assert_eq!(ws.option("applied"), None);
}

#[test]
fn test_template_continuation() {
    let mut ws = Workspace::new();
    let doc = ws.open_document(ws.root(), "a.rs", "fn main() {\n    \n}").unwrap();
    let template = Template::parse("let $NAME$ = $VALUE$;$END$")
        .with_default("NAME", "x")
        .with_default("VALUE", "0");
    let on_finish = Continuation::new(move |outcome: &TemplateOutcome| {
        let name = outcome.value("NAME").unwrap_or("x").to_string();
        Command::UpdateOption {
            name: "last_binding".to_string(),
            value: OptionValue::Text(name),
        }
    });
    let cmd = Command::StartTemplate {
        file: doc,
        range: TextRange::empty(16),
        template,
        on_finish,
    };
    let mut ui = RecordingUi::default();

    let mut execution = InteractiveExecution::new(cmd);
    let state = execution.run(&mut ws, &mut ui).unwrap();
    match state {
        ExecutionState::AwaitingUser(Suspension::Template { file, range, .. }) => {
            assert_eq!(*file, doc);
            assert_eq!(*range, TextRange::new(16, 26));
        }
        other => panic!("unexpected state {other:?}"),
    }
    assert_eq!(
        ws.document_text(doc).unwrap(),
        "fn main() {\n    let x = 0;\n}"
    );

    let mut outcome = TemplateOutcome::default();
    outcome.values.insert("NAME".to_string(), "total".to_string());
    execution
        .resume(UserInput::TemplateFinished(outcome), &mut ws, &mut ui)
        .unwrap();

    assert_eq!(execution.state(), &ExecutionState::Completed);
    assert_eq!(
        ws.option("last_binding"),
        Some(&OptionValue::Text("total".to_string()))
    );
    assert_eq!(ui.calls, vec![format!("template {doc} 16 let x = 0;")]);
}

#[test]
fn test_stale_update_shows_message_and_aborts() {
    let mut ws = Workspace::new();
    let doc = ws.open_document(ws.root(), "a.rs", "abc").unwrap();
    let cmd = {
        let mut session = MutationSession::new(&ws, doc);
        session.replace(doc, TextRange::new(0, 3), "xyz").unwrap();
        session.move_to(3).unwrap();
        session.into_command().unwrap()
    };
    ws.replace(doc, TextRange::new(0, 0), "!").unwrap();

    let config = ExecutorConfig {
        stale_document_message: "Document changed, can't proceed".to_string(),
        ..ExecutorConfig::default()
    };
    let mut ui = RecordingUi::default();
    let mut execution = InteractiveExecution::with_config(cmd, config);
    let state = execution.run(&mut ws, &mut ui).unwrap();

    assert!(matches!(state, ExecutionState::Aborted { .. }));
    assert_eq!(ws.document_text(doc).unwrap(), "!abc");
    assert_eq!(
        ui.calls,
        vec!["message Error Document changed, can't proceed".to_string()]
    );
}

#[test]
fn test_rename_revalidated_at_execution() {
    let mut ws = Workspace::new();
    let doc = ws.open_document(ws.root(), "a.rs", "let value = 1;").unwrap();
    let cmd = Command::StartRename(RenameRequest {
        file: doc,
        symbol_range: TextRange::new(0, 14),
        name_range: TextRange::new(4, 9),
        suggestions: vec!["total".to_string()],
    });
    ws.replace(doc, TextRange::new(5, 14), "").unwrap();
    let mut ui = RecordingUi::default();

    let mut execution = InteractiveExecution::new(cmd);
    let state = execution.run(&mut ws, &mut ui).unwrap();

    assert!(matches!(state, ExecutionState::Aborted { .. }));
    assert!(ui.calls.is_empty());
}

#[test]
fn test_registry_parks_suspended_executions() {
    let mut ws = Workspace::new();
    let doc = ws.open_document(ws.root(), "a.rs", "").unwrap();
    let cmd = Command::ChooseAction {
        title: "Fix".to_string(),
        candidates: vec![
            ActionCandidate::new("a", set("picked", 1)),
            ActionCandidate::new("b", set("picked", 2)),
        ],
    };
    let mut ui = RecordingUi::default();
    let mut registry = ExecutionRegistry::new();

    let mut execution = InteractiveExecution::new(cmd);
    execution.run(&mut ws, &mut ui).unwrap();
    registry.attach(doc, execution);

    // Later, when the user picks an entry:
    let parked = registry.get_mut(doc).unwrap();
    parked
        .resume(UserInput::Choose(0), &mut ws, &mut ui)
        .unwrap();
    assert!(parked.state().is_finished());
    registry.detach(doc);

    assert!(registry.is_empty());
    assert_eq!(ws.option("picked"), Some(&OptionValue::Int(1)));
}
