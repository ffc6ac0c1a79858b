mod common;

use common::MemoryService;
use mra_editor::service::ExperimentService;
use mra_editor::types::{
    ActionList, ExperimentRecord, ExperimentResult, ExperimentState, ResourceState, Submission,
    WireAgent, WireMra,
};
use mra_editor::{
    Algorithm, DirStore, EntityRef, Editor, ExperimentController, ExperimentError, Notification,
    SynthesisParameters,
};
use std::{sync::Arc, thread};

fn sample_editor() -> Editor {
    let mut editor = Editor::new();
    let a1 = editor.add_agent();
    let a2 = editor.add_agent();
    let r1 = editor.add_resource();
    let r2 = editor.add_resource();
    editor.set_agent_demand(&a1, 2);
    editor.set_agent_demand(&a2, 1);
    for (agt, res) in [(&a1, &r1), (&a1, &r2), (&a2, &r1)] {
        editor
            .connect(EntityRef::agent(agt), EntityRef::resource(res))
            .unwrap();
    }
    editor.set_parameters(SynthesisParameters {
        algorithm: Algorithm::EpsilonNashEquilibrium,
        number_of_iterations: 12,
        timebound: 6,
    });
    editor.set_message("hello solver");
    editor
}

fn two_step_result() -> ExperimentResult {
    ExperimentResult {
        resource_states: (0..3)
            .map(|i| ResourceState {
                resource_ids: vec!["1".to_string()],
                resource_states: vec![i],
            })
            .collect(),
        action_list: (0..2)
            .map(|_| ActionList {
                agent_ids: vec![1],
                actions: vec!["req1".to_string()],
            })
            .collect(),
    }
}

#[test]
fn submit_sends_parameters_as_strings() {
    let service = Arc::new(MemoryService::new());
    let ctrl = ExperimentController::new(Arc::clone(&service));

    let experiment = ctrl.submit(&sample_editor()).unwrap();

    assert_eq!(experiment.state, ExperimentState::Pending);
    let submissions = service.submissions();
    assert_eq!(submissions.len(), 1);
    let Submission {
        mra,
        algorithm,
        number_of_iterations,
        timebound,
        message,
    } = &submissions[0];
    assert_eq!(algorithm, "2");
    assert_eq!(number_of_iterations, "12");
    assert_eq!(timebound, "6");
    assert_eq!(message, "hello solver");
    assert!(mra.id.is_some());
    assert_eq!(mra.resources, Some(vec!["1".to_string(), "2".to_string()]));
    assert_eq!(
        mra.agents.as_ref().map(|agents| agents[0].clone()),
        Some(WireAgent {
            id: Some("1".to_string()),
            demand: Some(2),
            acc: Some(vec!["1".to_string(), "2".to_string()]),
        })
    );
}

#[test]
fn failed_submission_leaves_editor_untouched() {
    let service = Arc::new(MemoryService::new());
    service.set_offline(true);
    let ctrl = ExperimentController::new(Arc::clone(&service));
    let mut editor = sample_editor();
    let before = editor.scenario();

    let err = ctrl.submit(&editor).unwrap_err();

    assert!(matches!(err, ExperimentError::Submission(_)));
    assert!(err.is_transport());
    assert_eq!(*editor.scenario(), *before);
    assert!(service.submissions().is_empty());

    // Still editable.
    editor.add_agent();
    assert_eq!(editor.scenario().agents.len(), 3);
}

#[test]
fn resubmitting_a_loaded_experiment_renumbers_ids() {
    let service = Arc::new(MemoryService::new());
    let ctrl = ExperimentController::new(Arc::clone(&service));

    let mut scenario = mra_editor::Scenario::new();
    scenario.add_resource("gpu");
    scenario.add_resource("cpu");
    scenario.add_agent(mra_editor::Agent::new("worker-7", 3, vec!["cpu".to_string()]));
    let mut origin = Editor::new();
    origin.load_from_scenario(&scenario);
    let first = ctrl.submit(&origin).unwrap();

    service.insert_record(ExperimentRecord {
        id: "external".to_string(),
        algorithm: "0".to_string(),
        number_of_iterations: "10".to_string(),
        timebound: "5".to_string(),
        mra: WireMra {
            id: None,
            agents: Some(vec![WireAgent {
                id: Some("worker-7".to_string()),
                demand: Some(3),
                acc: Some(vec!["cpu".to_string()]),
            }]),
            resources: Some(vec!["gpu".to_string(), "cpu".to_string()]),
        },
        message: String::new(),
        state: ExperimentState::Successful,
    });

    let mut editor = Editor::new();
    ctrl.load_for_edit("external", &mut editor).unwrap();
    let second = ctrl.submit(&editor).unwrap();
    assert_ne!(first.id, second.id);

    let submissions = service.submissions();
    let resubmitted = &submissions[1].mra;
    let agents = resubmitted.agents.clone().unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].id.as_deref(), Some("1"));
    assert_eq!(agents[0].acc, Some(vec!["2".to_string()]));
    assert_eq!(resubmitted.resources, Some(vec!["1".to_string(), "2".to_string()]));

    // Same structure as the first submission, which went through the same renumbering.
    assert_eq!(submissions[0].mra.agents, resubmitted.agents);
    assert_eq!(submissions[0].mra.resources, resubmitted.resources);
}

#[test]
fn load_for_edit_restores_parameters() {
    let service = Arc::new(MemoryService::new());
    let ctrl = ExperimentController::new(Arc::clone(&service));
    let source = sample_editor();
    let experiment = ctrl.submit(&source).unwrap();

    let mut editor = Editor::new();
    let loaded = ctrl.load_for_edit(&experiment.id, &mut editor).unwrap();

    assert_eq!(loaded.parameters, source.scenario().parameters);
    assert_eq!(loaded.message, "hello solver");
    assert_eq!(loaded.agents.len(), 2);
    assert_eq!(loaded.n_grants(), 3);
    assert!(editor.is_consistent());
}

#[test]
fn failed_load_leaves_editor_untouched() {
    let service = Arc::new(MemoryService::new());
    let ctrl = ExperimentController::new(Arc::clone(&service));
    let mut editor = sample_editor();
    let scenario_before = editor.scenario();
    let graph_before = editor.graph().clone();

    let err = ctrl.load_for_edit("missing", &mut editor).unwrap_err();
    assert!(matches!(err, ExperimentError::Load(_)));

    service.insert_record(ExperimentRecord {
        id: "broken".to_string(),
        algorithm: "7".to_string(),
        number_of_iterations: "10".to_string(),
        timebound: "5".to_string(),
        mra: WireMra::default(),
        message: String::new(),
        state: ExperimentState::Pending,
    });
    let err = ctrl.load_for_edit("broken", &mut editor).unwrap_err();
    assert!(matches!(err, ExperimentError::MalformedRecord { .. }));
    assert!(!err.is_transport());

    service.set_offline(true);
    assert!(ctrl.load_for_edit("broken", &mut editor).is_err());

    assert_eq!(*editor.scenario(), *scenario_before);
    assert_eq!(*editor.graph(), graph_before);
}

#[test]
fn load_of_record_without_scenario_fields_is_empty() {
    let service = Arc::new(MemoryService::new());
    let ctrl = ExperimentController::new(Arc::clone(&service));
    service.insert_record(ExperimentRecord {
        id: "bare".to_string(),
        algorithm: "1".to_string(),
        number_of_iterations: "3".to_string(),
        timebound: "2".to_string(),
        mra: WireMra::default(),
        message: String::new(),
        state: ExperimentState::Pending,
    });

    let mut editor = sample_editor();
    let loaded = ctrl.load_for_edit("bare", &mut editor).unwrap();

    assert!(loaded.agents.is_empty());
    assert!(loaded.resources.is_empty());
    assert_eq!(loaded.parameters.algorithm, Algorithm::NashEquilibrium);
    assert!(editor.graph().nodes().is_empty());
}

#[test]
fn load_result_builds_path() {
    let service = Arc::new(MemoryService::new());
    let ctrl = ExperimentController::new(Arc::clone(&service));
    service.insert_result("done", two_step_result());

    let path = ctrl.load_result("done").unwrap();
    assert_eq!(path.nodes.len(), 3);
    assert_eq!(path.edges.len(), 2);

    assert!(matches!(
        ctrl.load_result("unknown"),
        Err(ExperimentError::Load(_))
    ));
}

#[test]
fn submitted_experiment_follows_observed_state() {
    let service = Arc::new(MemoryService::new());
    let ctrl = ExperimentController::new(Arc::clone(&service));
    let mut experiment = ctrl.submit(&sample_editor()).unwrap();

    assert!(!experiment.observe(&ctrl.list_metadata().unwrap()));
    assert_eq!(experiment.state, ExperimentState::Pending);

    service.set_state(&experiment.id, ExperimentState::Failed);
    assert!(experiment.observe(&ctrl.list_metadata().unwrap()));
    assert_eq!(experiment.state, ExperimentState::Failed);
}

#[test]
fn board_refreshes_once_per_notification() {
    let service = Arc::new(MemoryService::new());
    let ctrl = ExperimentController::new(Arc::clone(&service));
    let board = ctrl.watch();
    let first = ctrl.submit(&sample_editor()).unwrap();
    let second = ctrl.submit(&sample_editor()).unwrap();

    service.set_state(&first.id, ExperimentState::Successful);
    service.set_state(&second.id, ExperimentState::Failed);
    let handled = board.pump().unwrap();

    assert_eq!(
        handled,
        vec![
            Notification::ExperimentSuccessful(first.id.clone()),
            Notification::ExperimentFailed(second.id.clone()),
        ]
    );
    assert_eq!(board.n_refreshes(), 2);
    let metadata = board.metadata();
    assert_eq!(metadata.len(), 2);
    let state_of = |id: &str| metadata.iter().find(|m| m.id == id).map(|m| m.state);
    assert_eq!(state_of(&first.id), Some(ExperimentState::Successful));
    assert_eq!(state_of(&second.id), Some(ExperimentState::Failed));

    assert!(board.pump().unwrap().is_empty());
    assert_eq!(board.n_refreshes(), 2);
}

#[test]
fn dropping_board_stops_listening() {
    let service = Arc::new(MemoryService::new());
    let ctrl = ExperimentController::new(Arc::clone(&service));

    let board = ctrl.watch();
    assert_eq!(service.n_listeners(), 1);
    drop(board);
    assert_eq!(service.n_listeners(), 0);

    let experiment = ctrl.submit(&sample_editor()).unwrap();
    service.set_state(&experiment.id, ExperimentState::Successful);
    assert_eq!(service.n_listeners(), 0);
}

#[test]
fn concurrent_notifications_each_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DirStore::open(dir.path()).unwrap());
    let ctrl = ExperimentController::new(Arc::clone(&store));
    let board = Arc::new(ctrl.watch());

    let ids: Vec<String> = (0..8)
        .map(|_| ctrl.submit(&sample_editor()).unwrap().id)
        .collect();

    let workers: Vec<_> = ids
        .chunks(4)
        .enumerate()
        .map(|(i_worker, chunk)| {
            let store = Arc::clone(&store);
            let board = Arc::clone(&board);
            let chunk = chunk.to_vec();
            thread::spawn(move || {
                for id in &chunk {
                    if i_worker == 0 {
                        store.complete(id, &two_step_result()).unwrap();
                    } else {
                        store.fail(id).unwrap();
                    }
                    board.refresh().unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let handled = board.pump().unwrap();
    assert_eq!(handled.len(), 8);
    assert_eq!(board.n_refreshes(), 16);

    let metadata = board.metadata();
    assert_eq!(metadata.len(), 8);
    for id in &ids[..4] {
        let entry = metadata.iter().find(|m| &m.id == id).unwrap();
        assert_eq!(entry.state, ExperimentState::Successful);
    }
    for id in &ids[4..] {
        let entry = metadata.iter().find(|m| &m.id == id).unwrap();
        assert_eq!(entry.state, ExperimentState::Failed);
    }
    assert_eq!(store.list_metadata().unwrap(), metadata);
}
