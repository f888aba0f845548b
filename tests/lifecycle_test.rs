// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Lifecycle Tests
 * End-to-end target runs over a scripted protocol
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

mod common;

use parking_lot::Mutex;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use authsweep::config::{JitterRange, RunConfig};
use authsweep::connection::LifecycleState;
use authsweep::database::InMemoryCredentialStore;
use authsweep::modules::{ListenerRequest, ModuleContext, ModuleHook, ModuleLogger, ScanModule};
use authsweep::protocol::ActionSpec;
use authsweep::scan_state::SharedScanState;
use authsweep::types::SecretKind;

use common::{connection, strings, Recorder, RecordingModule, Script};

fn config_with(usernames: &[&str], passwords: &[&str]) -> RunConfig {
    let mut config = RunConfig::default();
    config.credentials.usernames = strings(usernames);
    config.credentials.passwords = strings(passwords);
    config
}

fn shared() -> Arc<SharedScanState> {
    Arc::new(SharedScanState::default())
}

#[tokio::test]
async fn test_unresolvable_host_halts_before_any_call() {
    let recorder = Recorder::new();
    let config = Arc::new(RunConfig::default());

    let report = connection("dc01.corp.local", Script::default(), &recorder, &config, &shared())
        .run()
        .await;

    assert_eq!(report.state, LifecycleState::Init);
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn test_create_connection_false_halts() {
    let recorder = Recorder::new();
    let config = Arc::new(config_with(&["alice"], &["pw"]));
    let script = Script {
        create: false,
        ..Default::default()
    };

    let report = connection("10.0.0.1", script, &recorder, &config, &shared())
        .run()
        .await;

    assert_eq!(report.state, LifecycleState::Resolved);
    assert_eq!(recorder.calls(), vec!["create_connection"]);
}

#[tokio::test]
async fn test_enumeration_error_halts() {
    let recorder = Recorder::new();
    let config = Arc::new(config_with(&["alice"], &["pw"]));
    let script = Script {
        fail_enumerate: true,
        ..Default::default()
    };

    let report = connection("10.0.0.1", script, &recorder, &config, &shared())
        .run()
        .await;

    assert_eq!(report.state, LifecycleState::ConnCreated);
    assert!(recorder.logins().is_empty());
}

#[tokio::test]
async fn test_print_host_info_false_skips_authentication() {
    let recorder = Recorder::new();
    let config = Arc::new(config_with(&["alice"], &["pw"]));
    let script = Script {
        print: false,
        ..Default::default()
    };

    let report = connection("10.0.0.1", script, &recorder, &config, &shared())
        .run()
        .await;

    assert_eq!(report.state, LifecycleState::HostEnumerated);
    assert!(recorder.logins().is_empty());
    assert_eq!(report.target.local_ip.as_deref(), Some("10.0.0.250"));
}

#[tokio::test]
async fn test_failed_authentication_stops_before_actions() {
    let recorder = Recorder::new();
    let mut config = config_with(&["alice"], &["wrong1", "wrong2"]);
    config.actions.insert("shares".into(), Value::Bool(true));
    let script = Script {
        actions: vec![ActionSpec {
            name: "shares",
            requires_admin: false,
        }],
        ..Default::default()
    };

    let report = connection("10.0.0.1", script, &recorder, &Arc::new(config), &shared())
        .run()
        .await;

    assert_eq!(report.state, LifecycleState::HostPrinted);
    assert_eq!(report.attempts, 2);
    assert!(!report.authenticated);
    assert_eq!(report.target.failed_logins, 2);
    assert!(!recorder.calls().iter().any(|c| c.starts_with("action:")));
}

#[tokio::test]
async fn test_null_session_proceeds_to_actions() {
    let recorder = Recorder::new();
    let mut config = RunConfig::default();
    config.actions.insert("shares".into(), Value::Bool(true));
    let script = Script {
        actions: vec![ActionSpec {
            name: "shares",
            requires_admin: false,
        }],
        ..Default::default()
    };

    let report = connection("10.0.0.1", script, &recorder, &Arc::new(config), &shared())
        .run()
        .await;

    assert!(report.completed());
    assert!(!report.authenticated);
    assert!(report.target.is_null_session());
    assert!(recorder.calls().contains(&"action:shares=true".to_string()));
}

#[tokio::test]
async fn test_successful_login_then_admin_check() {
    let recorder = Recorder::new();
    let config = Arc::new(config_with(&["alice", "bob"], &["p1", "p2"]));
    let script = Script {
        admin: true,
        domain: Some("CORP".into()),
        ..Script::accepting("bob", "p2")
    };

    let report = connection("10.0.0.1", script, &recorder, &config, &shared())
        .run()
        .await;

    assert!(report.completed());
    assert!(report.authenticated);
    assert!(report.is_admin);
    assert_eq!(report.attempts, 4);

    let calls = recorder.calls();
    let last_login = calls.iter().rposition(|c| c.contains("_login:")).unwrap();
    let admin_check = calls.iter().position(|c| c == "check_if_admin").unwrap();
    assert!(admin_check > last_login);

    // bare usernames inherit the discovered domain
    assert_eq!(recorder.logins()[0], "plaintext_login:CORP\\alice:p1");

    let identity = report.target.authenticated_as.unwrap();
    assert_eq!(identity.principal, "bob");
    assert_eq!(identity.kind, SecretKind::Plaintext);
}

#[tokio::test]
async fn test_domain_override_beats_discovered_domain() {
    let recorder = Recorder::new();
    let mut config = config_with(&["alice"], &["pw"]);
    config.credentials.domain = Some("LAB".into());
    let script = Script {
        domain: Some("CORP".into()),
        ..Default::default()
    };

    connection("10.0.0.1", script, &recorder, &Arc::new(config), &shared())
        .run()
        .await;

    assert_eq!(recorder.logins(), vec!["plaintext_login:LAB\\alice:pw"]);
}

#[tokio::test]
async fn test_actions_skip_false_null_and_unsupported() {
    let recorder = Recorder::new();
    let mut config = config_with(&["alice"], &["pw"]);
    config.actions.insert("shares".into(), Value::Bool(true));
    config.actions.insert("users".into(), Value::Bool(false));
    config.actions.insert("groups".into(), Value::Null);
    config.actions.insert("unknown".into(), Value::Bool(true));
    config.actions.insert("explode".into(), Value::Bool(true));
    config.actions.insert("sessions".into(), Value::String("10".into()));

    let spec = |name| ActionSpec {
        name,
        requires_admin: false,
    };
    let script = Script {
        actions: vec![spec("shares"), spec("users"), spec("groups"), spec("explode"), spec("sessions")],
        ..Script::accepting("alice", "pw")
    };

    let report = connection("10.0.0.1", script, &recorder, &Arc::new(config), &shared())
        .run()
        .await;

    let actions: Vec<String> = recorder
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("action:"))
        .collect();

    // configuration order, a failing action does not stop the next
    assert_eq!(
        actions,
        vec![
            "action:explode=true",
            "action:sessions=\"10\"",
            "action:shares=true",
        ]
    );
    assert!(report.completed());
}

#[tokio::test]
async fn test_admin_only_action_requires_privilege() {
    let admin_action = ActionSpec {
        name: "dump",
        requires_admin: true,
    };
    let mut config = config_with(&["alice"], &["pw"]);
    config.actions.insert("dump".into(), Value::Bool(true));
    let config = Arc::new(config);

    let recorder = Recorder::new();
    let script = Script {
        actions: vec![admin_action],
        ..Script::accepting("alice", "pw")
    };
    connection("10.0.0.1", script, &recorder, &config, &shared())
        .run()
        .await;
    assert!(!recorder.calls().iter().any(|c| c.starts_with("action:")));

    let recorder = Recorder::new();
    let script = Script {
        actions: vec![admin_action],
        admin: true,
        ..Script::accepting("alice", "pw")
    };
    connection("10.0.0.1", script, &recorder, &config, &shared())
        .run()
        .await;
    assert!(recorder.calls().contains(&"action:dump=true".to_string()));
}

#[tokio::test]
async fn test_module_hooks_order_and_isolation() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut failing = RecordingModule::new(
        "failing",
        vec![ModuleHook::OnLogin, ModuleHook::OnShutdown],
        Arc::clone(&log),
    );
    failing.fail_in = Some(ModuleHook::OnLogin);
    let full = RecordingModule::new(
        "full",
        vec![ModuleHook::OnLogin, ModuleHook::OnAdminLogin, ModuleHook::OnShutdown],
        Arc::clone(&log),
    );
    let modules: Vec<Arc<dyn ScanModule>> = vec![Arc::new(failing), Arc::new(full)];

    let mut config = config_with(&["alice"], &["pw"]);
    config.modules = strings(&["failing", "full"]);
    config.actions.insert("shares".into(), Value::Bool(true));

    let recorder = Recorder::new();
    let script = Script {
        admin: true,
        actions: vec![ActionSpec {
            name: "shares",
            requires_admin: false,
        }],
        ..Script::accepting("alice", "pw")
    };

    let report = connection("10.0.0.1", script, &recorder, &Arc::new(config), &shared())
        .with_modules(modules)
        .run()
        .await;

    assert!(report.completed());
    assert_eq!(
        *log.lock(),
        vec![
            "failing:OnLogin",
            "full:OnLogin",
            "full:OnAdminLogin",
            "full:OnShutdown",
        ]
    );
    // module mode replaces actions
    assert!(!recorder.calls().iter().any(|c| c.starts_with("action:")));
}

#[tokio::test]
async fn test_admin_hook_skipped_without_privilege() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let module = RecordingModule::new(
        "full",
        vec![ModuleHook::OnLogin, ModuleHook::OnAdminLogin],
        Arc::clone(&log),
    );

    let mut config = config_with(&["alice"], &["pw"]);
    config.modules = strings(&["full"]);

    connection(
        "10.0.0.1",
        Script::accepting("alice", "pw"),
        &Recorder::new(),
        &Arc::new(config),
        &shared(),
    )
    .with_modules(vec![Arc::new(module)])
    .run()
    .await;

    assert_eq!(*log.lock(), vec!["full:OnLogin"]);
}

#[tokio::test]
async fn test_listener_module_attaches_server_and_skips_shutdown() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let listener = RecordingModule::new(
        "listener",
        vec![ModuleHook::OnLogin, ModuleHook::OnRequest, ModuleHook::OnShutdown],
        Arc::clone(&log),
    );

    let mut config = config_with(&["alice"], &["pw"]);
    config.modules = strings(&["listener"]);
    let state = shared();

    connection(
        "10.0.0.7",
        Script::accepting("alice", "pw"),
        &Recorder::new(),
        &Arc::new(config),
        &state,
    )
    .with_modules(vec![Arc::new(listener)])
    .run()
    .await;

    assert_eq!(*log.lock(), vec!["listener:OnLogin"]);

    let attached = state.module_server().connection().unwrap();
    assert_eq!(attached.host, "10.0.0.7");
    assert_eq!(attached.protocol, "scripted");
    assert_eq!(state.module_server().local_ip().as_deref(), Some("10.0.0.250"));
}

#[tokio::test]
async fn test_listener_request_routed_to_attached_connection() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let listener = Arc::new(RecordingModule::new(
        "listener",
        vec![ModuleHook::OnRequest],
        Arc::clone(&log),
    ));
    let plain = RecordingModule::new("plain", vec![ModuleHook::OnLogin], Arc::clone(&log));

    let mut config = config_with(&["alice"], &["pw"]);
    config.modules = strings(&["listener"]);
    let config = Arc::new(config);
    let state = shared();

    let ctx = ModuleContext::new(
        Arc::clone(state.store()),
        ModuleLogger::new("listener", "10.0.0.9", 445, "10.0.0.9"),
        Arc::clone(&config),
        None,
    );
    let request = ListenerRequest {
        peer: "10.0.0.99".to_string(),
        body: "hello".to_string(),
    };
    let server = Arc::clone(state.module_server());

    // nothing attached yet
    assert_eq!(server.route(listener.as_ref(), &ctx, &request).await.unwrap(), None);

    let module: Arc<dyn ScanModule> = listener.clone();
    connection("10.0.0.9", Script::accepting("alice", "pw"), &Recorder::new(), &config, &state)
        .with_modules(vec![module])
        .run()
        .await;

    let reply = server.route(listener.as_ref(), &ctx, &request).await.unwrap();
    assert_eq!(reply.as_deref(), Some("hello from 10.0.0.99 for 10.0.0.9"));
    assert_eq!(server.route(&plain, &ctx, &request).await.unwrap(), None);
    assert_eq!(*log.lock(), vec!["listener:OnRequest"]);
}

#[tokio::test]
async fn test_paired_mismatch_continues_as_null_session() {
    let recorder = Recorder::new();
    let mut config = config_with(&["alice", "bob"], &["p1"]);
    config.bruteforce.no_bruteforce = true;
    config.actions.insert("shares".into(), Value::Bool(true));
    let script = Script {
        actions: vec![ActionSpec {
            name: "shares",
            requires_admin: false,
        }],
        ..Default::default()
    };

    let report = connection("10.0.0.1", script, &recorder, &Arc::new(config), &shared())
        .run()
        .await;

    assert_eq!(report.state, LifecycleState::Done);
    assert!(!report.authenticated);
    assert_eq!(report.attempts, 0);
    assert!(report.target.is_null_session());
    assert!(recorder.logins().is_empty());
    assert!(recorder.calls().contains(&"action:shares=true".to_string()));
}

#[tokio::test]
async fn test_kerberos_cache_makes_single_call() {
    let recorder = Recorder::new();
    let mut config = config_with(&["alice", "bob"], &["p1", "p2"]);
    config.kerberos.enabled = true;
    config.kerberos.use_kcache = true;

    let report = connection("10.0.0.1", Script::default(), &recorder, &Arc::new(config), &shared())
        .run()
        .await;

    assert!(report.completed());
    assert!(report.authenticated);
    assert_eq!(recorder.logins(), vec!["kerberos_login:alice:cache=true"]);
    // kerberos addressing keeps the supplied hostname
    assert_eq!(report.target.host, "10.0.0.1");
}

#[tokio::test]
async fn test_usernames_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "CORP\\alice").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "bob").unwrap();

    let mut config = RunConfig::default();
    config.credentials.usernames = vec![file.path().to_str().unwrap().to_string()];
    config.credentials.passwords = strings(&["pw"]);
    config.credentials.domain = Some("X".into());

    let recorder = Recorder::new();
    connection("10.0.0.1", Script::default(), &recorder, &Arc::new(config), &shared())
        .run()
        .await;

    assert_eq!(
        recorder.logins(),
        vec!["plaintext_login:CORP\\alice:pw", "plaintext_login:X\\bob:pw"]
    );
}

#[tokio::test]
async fn test_store_credentials_are_attempted_first() {
    let store = InMemoryCredentialStore::new();
    store.add(Some("CORP".into()), "svc_backup", "nthash", SecretKind::Hash, None);
    let state = Arc::new(SharedScanState::new(Arc::new(store)));

    let mut config = config_with(&["alice"], &["pw"]);
    config.credentials.cred_ids = strings(&["1"]);

    let recorder = Recorder::new();
    let report = connection(
        "10.0.0.1",
        Script::accepting("svc_backup", "nthash"),
        &recorder,
        &Arc::new(config),
        &state,
    )
    .run()
    .await;

    assert!(report.authenticated);
    assert_eq!(recorder.logins(), vec!["hash_login:svc_backup:nthash"]);
}

#[tokio::test]
async fn test_logins_serialized_across_targets() {
    let recorder = Recorder::new();
    let config = Arc::new(config_with(&["alice", "bob"], &["p1", "p2"]));
    let state = shared();
    let script = Script {
        login_delay: Duration::from_millis(5),
        ..Default::default()
    };

    let handles: Vec<_> = (1..=6)
        .map(|i| {
            let conn = connection(&format!("10.0.0.{}", i), script.clone(), &recorder, &config, &state);
            tokio::spawn(conn.run())
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(recorder.logins().len(), 24);
    assert_eq!(recorder.peak_in_flight(), 1);
}

#[tokio::test]
async fn test_global_fail_limit_spans_targets() {
    let recorder = Recorder::new();
    let mut config = config_with(&["alice"], &["p1", "p2"]);
    config.limits.global = Some(3);
    let config = Arc::new(config);
    let state = shared();

    for i in 1..=3 {
        connection(&format!("10.0.0.{}", i), Script::default(), &recorder, &config, &state)
            .run()
            .await;
    }

    assert_eq!(recorder.logins().len(), 3);
    assert_eq!(state.fail_counters().global(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_jitter_delays_start() {
    let mut config = RunConfig::default();
    config.jitter = Some(JitterRange { min: 2, max: 3 });

    let start = tokio::time::Instant::now();
    let report = connection("10.0.0.1", Script::default(), &Recorder::new(), &Arc::new(config), &shared())
        .run()
        .await;

    assert!(report.completed());
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test]
async fn test_response_module_admin_hook_without_shutdown() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let module = RecordingModule::new(
        "responder",
        vec![
            ModuleHook::OnLogin,
            ModuleHook::OnAdminLogin,
            ModuleHook::HasResponse,
            ModuleHook::OnShutdown,
        ],
        Arc::clone(&log),
    );

    let mut config = config_with(&["alice"], &["pw"]);
    config.modules = strings(&["responder"]);
    let script = Script {
        admin: true,
        ..Script::accepting("alice", "pw")
    };

    connection("10.0.0.1", script, &Recorder::new(), &Arc::new(config), &shared())
        .with_modules(vec![Arc::new(module)])
        .run()
        .await;

    assert_eq!(*log.lock(), vec!["responder:OnLogin", "responder:OnAdminLogin"]);
}
