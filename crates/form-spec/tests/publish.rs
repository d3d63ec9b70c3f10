use form_spec::{
    EngineConfig, FormEditingSession, FormRecord, FormStore, JsonDirStore, MemoryStore,
    PublishError, PublishPhase, PublishStatus, PublishedSnapshot, QuestionPatch, ShareLink,
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

#[test]
fn second_publish_while_in_flight_is_rejected() {
    let mut session = survey();
    let store = MemoryStore::new();

    let ticket = session.begin_publish().expect("begin");
    assert_eq!(session.publisher().phase(), PublishPhase::Publishing);
    assert!(matches!(
        session.begin_publish(),
        Err(PublishError::AlreadyPublishing)
    ));

    let outcome = store.save(ticket.record());
    session.finish_publish(ticket, outcome).expect("finish");
    assert_eq!(store.save_count(), 1);
    assert_eq!(session.publisher().phase(), PublishPhase::Published);
}

#[test]
fn published_record_is_persisted_with_snapshot() {
    let mut session = survey();
    let store = MemoryStore::new();
    let url = session.request_publish(&store).expect("publish").share_url.clone();

    let saved = store.get("form-42").expect("get").expect("saved record");
    assert_eq!(saved.publish_state.status, PublishStatus::Published);
    assert!(!saved.publish_state.draft_exists);
    assert!(saved.publish_state.published_at.is_some());
    let snapshot = saved.published.expect("snapshot");
    assert_eq!(snapshot.share_url, url);
    assert_eq!(snapshot.questions.len(), 7);
    assert!(url.starts_with("https://form.respondi.app/pesquisa-de-satisfacao-2024-"));
}

#[test]
fn failed_publish_keeps_prior_state_and_link() {
    let mut session = survey();
    let link = session.share_link().clone();
    let store = MemoryStore::new();
    store.set_failing(true);

    let err = session.request_publish(&store).unwrap_err();
    assert!(matches!(err, PublishError::PublishFailed { .. }));
    assert_eq!(session.publisher().phase(), PublishPhase::Draft);
    assert!(session.published().is_none());

    store.set_failing(false);
    session.request_publish(&store).expect("retry");
    assert_eq!(session.share_link(), &link);
    assert_eq!(store.save_count(), 2);
}

#[test]
fn snapshot_is_not_affected_by_later_edits() {
    let mut session = survey();
    let store = MemoryStore::new();
    session.request_publish(&store).expect("publish");

    session
        .update(&"name".into(), QuestionPatch::title("Nome completo"))
        .expect("update");
    let snapshot = session.published().expect("snapshot");
    assert_eq!(snapshot.questions[1].title, "Qual é o seu nome?");
    assert!(session.publisher().shows_draft_notice());
}

#[test]
fn share_link_survives_reopen_and_rename() {
    let mut session = survey();
    let link = session.share_link().clone();
    session.set_title("Outro título");

    let reopened =
        FormEditingSession::open(session.to_record(), EngineConfig::default()).expect("reopen");
    assert_eq!(reopened.share_link(), &link);
    assert_eq!(reopened.title(), "Outro título");
    assert_eq!(link.slug, "pesquisa-de-satisfacao-2024");
}

#[test]
fn stored_share_link_is_used_as_is() {
    let session = survey();
    assert_eq!(session.share_link().suffix, 482);
    assert_eq!(
        session.share_link().url,
        "https://form.respondi.app/pesquisa-de-satisfacao-2024-482"
    );
}

#[test]
fn missing_share_link_is_stable_across_opens() {
    let mut record: FormRecord = serde_json::from_str(fixture("survey_form")).expect("deserialize");
    record.share = None;

    let first = FormEditingSession::open(record.clone(), EngineConfig::default()).expect("open");
    let second = FormEditingSession::open(record, EngineConfig::default()).expect("open");
    assert_eq!(first.share_link(), second.share_link());
    assert_eq!(first.share_link().slug, "pesquisa-de-satisfacao-2024");

    let saved = first.to_record();
    assert_eq!(saved.share.as_ref(), Some(first.share_link()));
}

#[test]
fn share_link_falls_back_for_blank_slug() {
    let config = EngineConfig::default();
    let link = ShareLink::with_suffix("!!!", &config, 7);
    assert_eq!(link.url, "https://form.respondi.app/meu-formulario-7");
}

#[test]
fn snapshot_cbor_round_trip() {
    let mut session = survey();
    let store = MemoryStore::new();
    let snapshot = session.request_publish(&store).expect("publish").clone();

    let bytes = snapshot.to_cbor().expect("encode");
    assert_eq!(PublishedSnapshot::from_cbor(&bytes).expect("decode"), snapshot);
}

#[test]
fn json_dir_store_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonDirStore::new(dir.path());
    assert!(store.load("owner-1").expect("load").is_empty());

    let mut session = survey();
    session.request_publish(&store).expect("publish");
    let created = store.create_form("owner-1", "Segundo").expect("create");

    let forms = store.load("owner-1").expect("load");
    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0].id, created.id);
    assert_eq!(forms[1].id, "form-42");
    assert_eq!(forms[1].publish_state.status, PublishStatus::Published);
    assert_eq!(forms[1].share, Some(session.share_link().clone()));
    assert!(store.load("someone-else").expect("load").is_empty());
}

#[test]
fn memory_store_lists_newest_first() {
    let store = MemoryStore::new();
    let first = store.create_form("owner-1", "Primeiro").expect("create");
    let mut older: FormRecord = serde_json::from_str(fixture("survey_form")).expect("fixture");
    older.id = "old".into();
    store.save(&older).expect("save");

    let forms = store.load("owner-1").expect("load");
    assert_eq!(forms[0].id, first.id);
    assert_eq!(forms[1].id, "old");
}
