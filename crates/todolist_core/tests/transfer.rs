use serde_json::{json, Value};
use todolist_core::db::open_db_in_memory;
use todolist_core::{
    sqlite_document_store, DocumentStore, ExportType, ImportSource, ListService, ServiceError,
    ServiceErrorKind, TaskService, TransferService, FALLBACK_LIST_NAME, PLACEHOLDER_TASK_TEXT,
};

#[test]
fn export_list_reports_tasks_and_counts() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let lists = ListService::new(&store);
    let tasks = TaskService::new(&store);
    let transfer = TransferService::new(&store);

    lists.create("Groceries").unwrap();
    let milk = tasks.append("Groceries", "milk").unwrap();
    tasks.append("Groceries", "eggs").unwrap();
    tasks.toggle_complete("Groceries", milk.id).unwrap();

    let export = transfer.export_list("Groceries").unwrap();
    assert_eq!(export.export_type, ExportType::SingleList);
    assert_eq!(export.list_name, "Groceries");
    assert_eq!(export.total_tasks, 2);
    assert_eq!(export.completed_tasks, 1);

    let value: Value = serde_json::from_str(&export.to_json_pretty().unwrap()).unwrap();
    assert_eq!(value["exportType"], "single_list");
    assert_eq!(value["tasks"][0]["text"], "milk");
    assert!(value["tasks"][0]["completedAt"].is_string());
    assert!(value["tasks"][1]["completedAt"].is_null());

    assert_eq!(
        transfer.export_list("Missing").unwrap_err().kind(),
        ServiceErrorKind::NotFound
    );
}

#[test]
fn appended_task_exports_trimmed_and_open() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let lists = ListService::new(&store);
    let tasks = TaskService::new(&store);
    let transfer = TransferService::new(&store);

    lists.create("Inbox").unwrap();
    tasks.append("Inbox", "   buy stamps \t").unwrap();

    let export = transfer.export_list("Inbox").unwrap();
    assert_eq!(export.tasks.len(), 1);
    assert_eq!(export.tasks[0].text, "buy stamps");
    assert!(!export.tasks[0].completed);
    assert!(export.tasks[0].completed_at.is_none());

    let value: Value = serde_json::from_str(&export.to_json_pretty().unwrap()).unwrap();
    assert_eq!(value["tasks"][0]["text"], "buy stamps");
    assert_eq!(value["tasks"][0]["completed"], false);
    assert!(value["tasks"][0]["completedAt"].is_null());
}

#[test]
fn export_all_refuses_empty_document() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let transfer = TransferService::new(&store);

    assert!(matches!(
        transfer.export_all(),
        Err(ServiceError::EmptyDocument)
    ));
}

#[test]
fn export_all_carries_statistics_per_list() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let lists = ListService::new(&store);
    let tasks = TaskService::new(&store);
    let transfer = TransferService::new(&store);

    lists.create("A").unwrap();
    lists.create("B").unwrap();
    let a1 = tasks.append("A", "a1").unwrap();
    tasks.append("A", "a2").unwrap();
    tasks.toggle_complete("A", a1.id).unwrap();

    let value: Value =
        serde_json::from_str(&transfer.export_all().unwrap().to_json_pretty().unwrap()).unwrap();
    assert_eq!(value["exportType"], "complete_lists");
    assert_eq!(value["totalLists"], 2);
    assert_eq!(value["totalTasks"], 2);
    assert_eq!(value["totalCompleted"], 1);
    assert_eq!(
        value["statistics"]["A"],
        json!({"total": 2, "completed": 1, "pending": 1})
    );
    assert_eq!(
        value["statistics"]["B"],
        json!({"total": 0, "completed": 0, "pending": 0})
    );
}

#[test]
fn reimporting_a_complete_export_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let lists = ListService::new(&store);
    let tasks = TaskService::new(&store);
    let transfer = TransferService::new(&store);

    lists.create("Home").unwrap();
    lists.create("Work").unwrap();
    let t = tasks.append("Home", "sweep").unwrap();
    tasks.append("Work", "report").unwrap();
    tasks.toggle_complete("Home", t.id).unwrap();
    let before = store.load().unwrap().into_document();

    let raw = transfer.export_all().unwrap().to_json_pretty().unwrap();
    let summary = transfer.import_envelope(&raw).unwrap();
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.replaced, 2);
    assert_eq!(summary.total_tasks, 2);

    assert_eq!(store.load().unwrap().into_document(), before);
}

#[test]
fn complete_import_replaces_lists_wholesale_and_keeps_others() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let lists = ListService::new(&store);
    let tasks = TaskService::new(&store);
    let transfer = TransferService::new(&store);

    lists.create("Shared").unwrap();
    lists.create("LocalOnly").unwrap();
    tasks.append("Shared", "local task").unwrap();
    tasks.append("LocalOnly", "keep me").unwrap();

    let raw = json!({
        "exportType": "complete_lists",
        "lists": {
            "Shared": [{"text": "remote task", "completed": true,
                        "createdAt": "2024-01-02T03:04:05.678Z",
                        "completedAt": "2024-01-03T00:00:00.000Z"}],
            "Fresh": []
        }
    })
    .to_string();

    let plan = transfer.plan_import(&raw).unwrap();
    assert_eq!(plan.source, ImportSource::CompleteLists);
    assert_eq!(plan.replaced_lists, ["Shared"]);
    assert_eq!(plan.new_lists, ["Fresh"]);
    assert_eq!(plan.total_tasks, 1);
    assert_eq!(plan.completed_tasks, 1);

    let summary = transfer.apply_import(&plan).unwrap();
    assert_eq!((summary.imported, summary.replaced), (1, 1));

    let shared = lists.get("Shared").unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].text, "remote task");
    assert!(shared[0].completed);
    assert_eq!(
        shared[0].created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "2024-01-02T03:04:05.678Z"
    );
    assert_eq!(lists.get("LocalOnly").unwrap()[0].text, "keep me");
    assert!(lists.get("Fresh").unwrap().is_empty());
}

#[test]
fn single_list_import_uses_list_name_and_normalizes_tasks() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let lists = ListService::new(&store);
    let transfer = TransferService::new(&store);

    let raw = json!({
        "exportType": "single_list",
        "listName": "Trip",
        "tasks": [
            {"text": "passport", "completed": "yes", "createdAt": "not a date"},
            {"completed": true}
        ]
    })
    .to_string();

    let plan = transfer.plan_import(&raw).unwrap();
    assert_eq!(plan.source, ImportSource::SingleList);
    assert_eq!(plan.list_names().collect::<Vec<_>>(), ["Trip"]);
    transfer.apply_import(&plan).unwrap();

    let trip = lists.get("Trip").unwrap();
    assert_eq!(trip[0].text, "passport");
    assert!(!trip[0].completed);
    assert_eq!(trip[1].text, PLACEHOLDER_TASK_TEXT);
    assert!(trip[1].completed);
    assert_ne!(trip[0].id, trip[1].id);
}

#[test]
fn legacy_import_without_list_name_uses_fallback() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let lists = ListService::new(&store);
    let transfer = TransferService::new(&store);

    let raw = json!({"tasks": [{"text": "old"}]}).to_string();
    let plan = transfer.plan_import(&raw).unwrap();
    assert_eq!(plan.source, ImportSource::Legacy);
    transfer.apply_import(&plan).unwrap();

    assert_eq!(lists.get(FALLBACK_LIST_NAME).unwrap()[0].text, "old");
}

#[test]
fn malformed_input_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let lists = ListService::new(&store);
    let transfer = TransferService::new(&store);
    lists.create("Untouched").unwrap();
    let revision = store.revision().unwrap();

    assert_eq!(
        transfer.import_envelope("{ not json").unwrap_err().kind(),
        ServiceErrorKind::ParseError
    );
    for raw in [
        json!([1, 2]),
        json!({"exportType": "complete_lists"}),
        json!({"lists": {}}),
        json!({"tasks": ["plain string"]}),
        json!({"exportType": "complete_lists", "lists": {"X": "nope"}}),
    ] {
        assert_eq!(
            transfer
                .import_envelope(&raw.to_string())
                .unwrap_err()
                .kind(),
            ServiceErrorKind::InvalidFormat,
            "{raw}"
        );
    }
    assert_eq!(store.revision().unwrap(), revision);
}

#[test]
fn import_into_replaces_only_the_target_list() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let lists = ListService::new(&store);
    let tasks = TaskService::new(&store);
    let transfer = TransferService::new(&store);

    lists.create("Target").unwrap();
    tasks.append("Target", "old").unwrap();

    let raw = json!({
        "exportType": "single_list",
        "listName": "Elsewhere",
        "tasks": [{"text": "new one"}, {"text": "new two"}]
    })
    .to_string();

    let plan = transfer.plan_import_into("Target", &raw).unwrap();
    assert_eq!(plan.replaced_lists, ["Target"]);
    assert!(plan.new_lists.is_empty());
    transfer.apply_import(&plan).unwrap();

    let texts: Vec<_> = lists
        .get("Target")
        .unwrap()
        .into_iter()
        .map(|task| task.text)
        .collect();
    assert_eq!(texts, ["new one", "new two"]);
    assert!(lists.get("Elsewhere").is_err());

    assert_eq!(
        transfer.import_into("Missing", &raw).unwrap_err().kind(),
        ServiceErrorKind::NotFound
    );
}

#[test]
fn imported_list_names_follow_registry_rules() {
    let conn = open_db_in_memory().unwrap();
    let store = sqlite_document_store(&conn).unwrap();
    let lists = ListService::new(&store);
    let transfer = TransferService::new(&store);

    for raw in [
        json!({"exportType": "complete_lists", "lists": {"   ": [], "": []}}),
        json!({"exportType": "complete_lists", "lists": {"A": [], " A ": []}}),
        json!({"listName": "x".repeat(51), "tasks": []}),
    ] {
        assert_eq!(
            transfer
                .import_envelope(&raw.to_string())
                .unwrap_err()
                .kind(),
            ServiceErrorKind::InvalidFormat,
            "{raw}"
        );
    }
    assert!(lists.list().unwrap().is_empty());

    let raw = json!({"exportType": "complete_lists", "lists": {"  Padded  ": []}}).to_string();
    transfer.import_envelope(&raw).unwrap();
    assert!(lists.get("Padded").unwrap().is_empty());

    let raw = json!({"listName": "   ", "tasks": [{"text": "t"}]}).to_string();
    transfer.import_envelope(&raw).unwrap();
    assert_eq!(lists.get(FALLBACK_LIST_NAME).unwrap().len(), 1);
}
