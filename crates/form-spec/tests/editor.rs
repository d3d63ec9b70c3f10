use form_spec::{
    Direction, EditError, EngineConfig, FileRef, FormEditingSession, FormRecord, MemoryStore,
    PublishPhase, Question, QuestionId, QuestionKind, QuestionList, QuestionPatch, outline,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "survey_form" => include_str!("../tests/fixtures/survey_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn survey() -> FormEditingSession {
    let record: FormRecord = serde_json::from_str(fixture("survey_form")).expect("deserialize");
    FormEditingSession::open(record, EngineConfig::default()).expect("open")
}

fn kinds(list: &QuestionList) -> Vec<QuestionKind> {
    list.iter().map(|question| question.kind).collect()
}

#[test]
fn appended_questions_stay_before_thank_you() {
    let mut list = QuestionList::default();
    let created: Vec<QuestionId> = (0..3).map(|_| list.create_and_append()).collect();

    assert_eq!(list.len(), 7);
    let ids: Vec<&QuestionId> = list.iter().map(|question| &question.id).collect();
    assert_eq!(ids[3..6], [&created[0], &created[1], &created[2]]);
    assert_eq!(list.questions()[6].kind, QuestionKind::ThankYou);
    assert_eq!(list.active_id(), &created[2]);
}

#[test]
fn removing_down_to_one_question_then_fails() {
    let mut list = QuestionList::default();
    while list.len() > 1 {
        let id = list.questions()[0].id.clone();
        list.remove(&id).expect("remove");
    }
    let last = list.questions()[0].id.clone();

    assert_eq!(list.remove(&last).unwrap_err(), EditError::LastQuestion);
    assert_eq!(list.len(), 1);
    assert_eq!(list.active_id(), &last);
}

#[test]
fn fixture_loads_with_kind_owned_fields() {
    let session = survey();
    let list = session.questions();
    assert_eq!(list.len(), 7);
    assert_eq!(list.active_id().as_str(), "welcome");

    let plan = list.get(&"plan".into()).expect("plan");
    assert_eq!(plan.options.as_deref(), Some(&["Grátis".to_string(), "Pro".to_string()][..]));
    let city = list.get(&"city".into()).expect("city");
    assert_eq!(city.list_items(), ["São Paulo", "Rio de Janeiro"]);
    assert!(list.get(&"name".into()).expect("name").options.is_none());
}

#[test]
fn kind_change_reshapes_fields() {
    let mut session = survey();
    let plan = QuestionId::from("plan");
    session
        .update(&plan, QuestionPatch::kind(QuestionKind::ListSelect))
        .expect("update");

    let question = session.questions().get(&plan).expect("plan");
    assert_eq!(question.kind, QuestionKind::ListSelect);
    assert!(question.options.is_none());
    assert_eq!(question.list_options.as_deref(), Some(""));
    assert_eq!(question.title, "Qual plano você usa?");
}

#[test]
fn second_welcome_step_is_rejected() {
    let mut session = survey();
    let before = session.questions().clone();
    let err = session
        .update(&"feedback".into(), QuestionPatch::kind(QuestionKind::Welcome))
        .unwrap_err();
    assert_eq!(err, EditError::DuplicateStructural(QuestionKind::Welcome));
    assert_eq!(session.questions(), &before);
}

#[test]
fn moves_and_cursor_navigation() {
    let mut session = survey();
    assert!(session.move_question(1, Direction::Down));
    assert_eq!(
        kinds(session.questions())[1..3],
        [QuestionKind::Email, QuestionKind::ProperName]
    );
    assert!(!session.move_question(6, Direction::Down));

    session.select(&"end".into()).expect("select");
    assert!(!session.questions().has_next());
    session.select_next();
    assert_eq!(session.questions().active_id().as_str(), "end");
    session.select_previous();
    assert_eq!(session.questions().active_id().as_str(), "feedback");
}

#[test]
fn removing_active_question_moves_cursor_back() {
    let mut session = survey();
    session.select(&"plan".into()).expect("select");
    session.remove_active().expect("remove");
    assert_eq!(session.questions().active_id().as_str(), "email");
    assert_eq!(
        session.select(&"plan".into()).unwrap_err(),
        EditError::NotFound("plan".into())
    );
}

#[test]
fn insert_after_accepts_minus_one_and_rejects_out_of_range() {
    let mut session = survey();
    let first = session.create_and_insert_after(-1).expect("insert");
    assert_eq!(session.questions().questions()[0].id, first);

    let len = session.questions().len();
    let err = session.create_and_insert_after(len as isize).unwrap_err();
    assert_eq!(
        err,
        EditError::OutOfRange {
            index: len as isize,
            len
        }
    );
    assert_eq!(session.questions().len(), len);
}

#[test]
fn explicit_insert_after_thank_you_is_allowed() {
    let mut list = QuestionList::default();
    let id = list.create_and_insert_after(3).expect("insert");
    assert_eq!(list.questions()[4].id, id);
}

#[test]
fn thank_you_cannot_be_recreated_mid_form() {
    let mut list = QuestionList::default();
    list.remove(&"end".into()).expect("remove thank-you");
    let before = list.clone();

    assert_eq!(
        list.update(&"1".into(), QuestionPatch::kind(QuestionKind::ThankYou)),
        Err(EditError::MisplacedStructural(QuestionKind::ThankYou))
    );
    assert_eq!(list, before);

    list.update(&"3".into(), QuestionPatch::kind(QuestionKind::ThankYou))
        .expect("last slot");
    list.create_and_append();
    assert_eq!(
        kinds(&list).last(),
        Some(&QuestionKind::ThankYou)
    );
}

#[test]
fn welcome_only_fits_the_first_slot() {
    let mut session = survey();
    session.remove(&"welcome".into()).expect("remove welcome");
    assert_eq!(
        session.update(&"email".into(), QuestionPatch::kind(QuestionKind::Welcome)),
        Err(EditError::MisplacedStructural(QuestionKind::Welcome))
    );
    session
        .update(&"name".into(), QuestionPatch::kind(QuestionKind::Welcome))
        .expect("first slot");
    assert_eq!(kinds(session.questions())[0], QuestionKind::Welcome);
}

#[test]
fn inconsistent_stored_questions_are_refused() {
    let question = |id: &str, kind| Question::new(QuestionId::from(id), kind, "Pergunta");
    let mut record: FormRecord =
        serde_json::from_str(fixture("survey_form")).expect("deserialize");

    record.questions = vec![
        question("x", QuestionKind::ThankYou),
        question("x", QuestionKind::Email),
        question("w", QuestionKind::Welcome),
    ];
    assert_eq!(
        FormEditingSession::open(record.clone(), EngineConfig::default()).unwrap_err(),
        EditError::DuplicateId("x".into())
    );

    record.questions = vec![
        question("t", QuestionKind::ThankYou),
        question("e", QuestionKind::Email),
        question("w", QuestionKind::Welcome),
    ];
    assert_eq!(
        FormEditingSession::open(record.clone(), EngineConfig::default()).unwrap_err(),
        EditError::MisplacedStructural(QuestionKind::ThankYou)
    );

    record.questions = vec![
        question("w1", QuestionKind::Welcome),
        question("w2", QuestionKind::Welcome),
    ];
    assert_eq!(
        FormEditingSession::open(record, EngineConfig::default()).unwrap_err(),
        EditError::DuplicateStructural(QuestionKind::Welcome)
    );
}

#[test]
fn empty_stored_questions_seed_defaults() {
    let mut record: FormRecord =
        serde_json::from_str(fixture("survey_form")).expect("deserialize");
    record.questions.clear();
    let session = FormEditingSession::open(record, EngineConfig::default()).expect("open");
    assert_eq!(session.questions(), &QuestionList::default());
}

#[test]
fn options_only_on_multiple_choice() {
    let mut session = survey();
    let err = session.add_option(&"name".into(), "x").unwrap_err();
    assert_eq!(
        err,
        EditError::FieldNotOwned {
            kind: QuestionKind::ProperName,
            field: "options"
        }
    );

    let plan = QuestionId::from("plan");
    session.update_option(&plan, 1, "Empresa").expect("update option");
    assert_eq!(session.remove_option(&plan, 0).expect("remove"), "Grátis");
    assert!(matches!(
        session.remove_option(&plan, 5),
        Err(EditError::OutOfRange { index: 5, len: 1 })
    ));
}

#[test]
fn edits_mark_a_draft_but_selection_does_not() {
    let mut session = survey();
    let store = MemoryStore::new();
    session.request_publish(&store).expect("publish");
    assert!(!session.publisher().draft_exists());

    session.select(&"email".into()).expect("select");
    session.select_next();
    assert!(!session.publisher().draft_exists());

    session
        .update_active(QuestionPatch::title("Qual plano?"))
        .expect("update");
    assert!(session.publisher().draft_exists());
    assert_eq!(session.publisher().phase(), PublishPhase::Published);
}

#[test]
fn detaching_nothing_leaves_published_form_clean() {
    let mut session = survey();
    let upload = session.create_and_append();
    session
        .update(&upload, QuestionPatch::kind(QuestionKind::FileAttachment))
        .expect("update");
    session
        .request_publish(&MemoryStore::new())
        .expect("publish");

    assert_eq!(session.detach_file(&upload), Ok(None));
    assert!(matches!(
        session.detach_file(&"name".into()),
        Err(EditError::FieldNotOwned { .. })
    ));
    assert!(!session.publisher().draft_exists());

    let file = FileRef {
        reference: "files/regulamento.pdf".into(),
        name: "regulamento.pdf".into(),
        size: 2048,
    };
    session.attach_file(&upload, file.clone()).expect("attach");
    session
        .request_publish(&MemoryStore::new())
        .expect("publish again");
    assert_eq!(session.detach_file(&upload), Ok(Some(file)));
    assert!(session.publisher().draft_exists());
}

#[test]
fn outline_reflects_structural_badges() {
    let session = survey();
    let badges: Vec<String> = outline(session.questions())
        .into_iter()
        .map(|entry| entry.badge)
        .collect();
    assert_eq!(badges, ["Start", "2", "3", "4", "5", "6", "7"]);
}

#[test]
fn move_up_then_down_restores_order() {
    let mut session = survey();
    let before = session.questions().clone();
    for index in 1..session.questions().len() {
        assert!(session.move_question(index, Direction::Up));
        assert!(session.move_question(index - 1, Direction::Down));
        assert_eq!(session.questions().questions(), before.questions());
    }
}

#[test]
fn question_list_survives_serialization() {
    let mut session = survey();
    let plan = QuestionId::from("plan");
    session.add_option(&plan, "Pro").expect("duplicate option");
    session.add_option(&plan, "Empresa").expect("add");

    let json = serde_json::to_string(session.questions().questions()).expect("serialize");
    let restored: Vec<form_spec::Question> = serde_json::from_str(&json).expect("deserialize");
    let restored = QuestionList::try_from_questions(restored).expect("valid list");

    assert_eq!(restored.questions(), session.questions().questions());
    assert_eq!(
        restored.get(&plan).and_then(|question| question.options.clone()),
        Some(vec![
            "Grátis".to_string(),
            "Pro".to_string(),
            "Pro".to_string(),
            "Empresa".to_string()
        ])
    );
}
