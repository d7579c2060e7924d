//! Common test utilities

use std::sync::Arc;

use frontedit::editor::{EditorContext, MemoryNotifier};
use frontedit::models::{Actor, MultilingualValue, Role};
use frontedit::orchestrator::TranslationOrchestrator;
use frontedit::session::EditModeSession;
use frontedit::storage::Database;
use frontedit::translation::MockTranslator;

#[allow(dead_code)]
pub fn editor_actor() -> Actor {
    Actor::new("editor-1", Role::Editor)
}

#[allow(dead_code)]
pub fn admin_actor() -> Actor {
    Actor::new("admin-1", Role::Admin)
}

/// Value with all four slots set
#[allow(dead_code)]
pub fn value(en: &str, la: &str, th: &str, zh: &str) -> MultilingualValue {
    MultilingualValue {
        en: en.to_string(),
        la: la.to_string(),
        th: th.to_string(),
        zh: zh.to_string(),
    }
}

/// In-memory database, mock gateway and an editor context with edit mode on
#[allow(dead_code)]
pub struct Harness {
    pub db: Database,
    pub mock: Arc<MockTranslator>,
    pub notifier: Arc<MemoryNotifier>,
    pub edit_mode: Arc<EditModeSession>,
    pub ctx: EditorContext,
}

#[allow(dead_code)]
pub fn harness(mock: MockTranslator) -> Harness {
    let db = Database::in_memory().expect("in-memory database");
    let mock = Arc::new(mock);
    let notifier = Arc::new(MemoryNotifier::new());
    let edit_mode = Arc::new(EditModeSession::new());
    let actor = editor_actor();
    edit_mode.set_enabled(&actor, true);

    let ctx = EditorContext::new(
        actor,
        Arc::clone(&edit_mode),
        Arc::new(TranslationOrchestrator::new(mock.clone())),
        Arc::new(db.settings()),
        Arc::new(db.records()),
    )
    .with_notifier(notifier.clone());

    Harness {
        db,
        mock,
        notifier,
        edit_mode,
        ctx,
    }
}
