// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Validate taish navigation, dispatch and error reporting against a recording client.
// Author: Lukas Bower

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use taish::{
    ApiScope, AttributeMetadata, Client, CommandStatus, LogLevel, ModuleSummary, Notification,
    NotifiedAttribute, ObjectHandle, ObjectSummary, ObjectType, Shell, TaiError, TaiResult,
};

/// Client double that records every call and keeps attribute values in a map.
#[derive(Default)]
struct RecordingClient {
    calls: RefCell<Vec<String>>,
    values: RefCell<BTreeMap<(u64, String), String>>,
    metadata_failure: Option<TaiError>,
    /// When set, `monitor` streams until this flag is raised and the
    /// cancellation it was handed is observed.
    ctrl_c: Option<Arc<AtomicBool>>,
}

impl RecordingClient {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

fn meta(attr_id: u32, name: &str, readonly: bool, usage: &str) -> AttributeMetadata {
    AttributeMetadata {
        attr_id,
        short_name: name.to_owned(),
        is_readonly: readonly,
        usage: usage.to_owned(),
    }
}

impl Client for RecordingClient {
    fn kind(&self) -> &'static str {
        "recording"
    }

    fn list(&self) -> TaiResult<Vec<ModuleSummary>> {
        Ok(vec![ModuleSummary {
            location: "1".to_owned(),
            present: true,
            oid: 0x10,
            netifs: vec![ObjectSummary {
                index: 0,
                oid: 0x11,
            }],
            hostifs: Vec::new(),
        }])
    }

    fn list_attribute_metadata(&self, object_type: ObjectType) -> TaiResult<Vec<AttributeMetadata>> {
        if let Some(TaiError::Status { code, message }) = &self.metadata_failure {
            return Err(TaiError::status(*code, message.clone()));
        }
        Ok(match object_type {
            ObjectType::NetIf => vec![
                meta(1, "tx-enable", false, "<bool>"),
                meta(2, "custom-list", false, "<uint32 list>"),
                meta(3, "oper-status", true, "[unknown|ready]"),
                meta(4, "output-power", false, "<float>"),
                meta(5, "notify", false, "<notification>"),
            ],
            _ => vec![meta(1, "notify", false, "<notification>")],
        })
    }

    fn get(&self, object: ObjectHandle, attr: &str, json: bool) -> TaiResult<String> {
        self.record(format!("get 0x{:x} {attr} json={json}", object.oid));
        self.values
            .borrow()
            .get(&(object.oid, attr.to_owned()))
            .cloned()
            .ok_or_else(|| TaiError::status(0x7, format!("{attr} not set")))
    }

    fn set(&self, object: ObjectHandle, attr: &str, value: &str) -> TaiResult<()> {
        self.record(format!("set 0x{:x} {attr}={value}", object.oid));
        self.values
            .borrow_mut()
            .insert((object.oid, attr.to_owned()), value.to_owned());
        Ok(())
    }

    fn get_attribute_capability(&self, _object: ObjectHandle, attr: &str) -> TaiResult<String> {
        Ok(format!("{attr}: any"))
    }

    fn create(
        &self,
        object_type: ObjectType,
        attrs: &[(String, String)],
        module_oid: u64,
    ) -> TaiResult<u64> {
        self.record(format!("create {object_type} {attrs:?} 0x{module_oid:x}"));
        Ok(0x20)
    }

    fn remove(&self, oid: u64) -> TaiResult<()> {
        self.record(format!("remove 0x{oid:x}"));
        Ok(())
    }

    fn monitor(
        &self,
        object: ObjectHandle,
        attr: &str,
        json: bool,
        callback: &mut dyn FnMut(&Notification),
        cancel: &AtomicBool,
    ) -> TaiResult<()> {
        self.record(format!("monitor 0x{:x} {attr}", object.oid));
        let value = if json { "\"ready\"" } else { "ready" };
        let notification = Notification {
            oid: object.oid,
            attrs: vec![NotifiedAttribute {
                attr_id: 3,
                value: value.to_owned(),
            }],
        };
        callback(&notification);
        let Some(ctrl_c) = &self.ctrl_c else {
            return Ok(());
        };
        ctrl_c.store(true, Ordering::SeqCst);
        for _ in 0..1_000 {
            if cancel.load(Ordering::SeqCst) {
                return Ok(());
            }
        }
        Err(TaiError::status(0x1, "stream was never cancelled"))
    }

    fn set_log_level(&self, level: LogLevel, api: ApiScope) -> TaiResult<()> {
        self.record(format!("log-level {level:?} {api:?}"));
        Ok(())
    }
}

fn shell(client: &Rc<RecordingClient>) -> Shell<Cursor<Vec<u8>>> {
    let client: Rc<dyn Client> = Rc::clone(client) as Rc<dyn Client>;
    Shell::new(client, Cursor::new(Vec::new()))
}

fn rendered(shell: Shell<Cursor<Vec<u8>>>) -> String {
    let (_client, cursor) = shell.into_parts();
    String::from_utf8(cursor.into_inner()).expect("utf8 output")
}

#[test]
fn set_then_get_round_trips_through_client() {
    let client = Rc::new(RecordingClient::default());
    let mut shell = shell(&client);
    shell.execute("module 1").unwrap();
    shell.execute("netif 0").unwrap();
    shell.execute("set tx t").unwrap();
    shell.execute("get tx").unwrap();
    assert_eq!(
        client.calls(),
        ["set 0x11 tx-enable=true", "get 0x11 tx-enable json=false"]
    );
    assert_eq!(rendered(shell), "true\n");
}

#[test]
fn opaque_values_are_joined_verbatim() {
    let client = Rc::new(RecordingClient::default());
    let mut shell = shell(&client);
    shell.run_batch("module 1; netif 0; set custom-list 1,2,3,4; set output-power -1.5 dBm").unwrap();
    assert_eq!(
        client.calls(),
        [
            "set 0x11 custom-list=1,2,3,4",
            "set 0x11 output-power=-1.5 dBm",
        ]
    );
}

#[test]
fn read_only_attributes_are_not_settable() {
    let client = Rc::new(RecordingClient::default());
    let mut shell = shell(&client);
    shell.run_batch("module 1; netif 0; set oper-status ready").unwrap();
    assert!(client.calls().is_empty());
    assert_eq!(
        rendered(shell),
        "invalid argument. candidates: [tx-enable, custom-list, output-power, notify]\n"
    );
}

#[test]
fn quit_returns_to_the_same_parent_context() {
    let client = Rc::new(RecordingClient::default());
    let mut shell = shell(&client);
    let root = shell.context();
    shell.execute("module 1").unwrap();
    let module = shell.context();
    assert!(!Rc::ptr_eq(&root, &module));
    shell.execute("netif 0").unwrap();
    assert_eq!(shell.execute("quit").unwrap(), CommandStatus::Continue);
    assert!(Rc::ptr_eq(&shell.context(), &module));
    assert_eq!(shell.execute("quit").unwrap(), CommandStatus::Continue);
    assert!(Rc::ptr_eq(&shell.context(), &root));
    assert_eq!(shell.execute("quit").unwrap(), CommandStatus::Quit);
}

#[test]
fn status_failures_print_code_and_keep_context() {
    let client = Rc::new(RecordingClient::default());
    let mut shell = shell(&client);
    shell.run_batch("module 1; netif 0; get output-power").unwrap();
    assert_eq!(shell.prompt(), "module(1)/netif(0)> ");
    assert_eq!(rendered(shell), "err: output-power not set (code 7)\n");
}

#[test]
fn monitor_defaults_to_notify_and_names_attributes() {
    let client = Rc::new(RecordingClient::default());
    let mut shell = shell(&client);
    shell.run_batch("module 1; netif 0; monitor").unwrap();
    assert_eq!(client.calls(), ["monitor 0x11 notify"]);
    assert_eq!(rendered(shell), "oper-status | ready\n\n");
}

#[test]
fn json_mode_reaches_the_client() {
    let client = Rc::new(RecordingClient::default());
    let mut shell = shell(&client).with_json(true);
    shell.run_batch("module 1; netif 0; monitor notify").unwrap();
    assert_eq!(
        rendered(shell),
        "{\"name\":\"oper-status\",\"value\":\"ready\"}\n\n"
    );
}

#[test]
fn root_commands_parse_their_arguments() {
    let client = Rc::new(RecordingClient::default());
    let mut shell = shell(&client);
    shell.execute("log-level warn net").unwrap();
    shell.execute("create hostif 0x10 index:1 fec-type:rs").unwrap();
    shell.execute("remove 0x11").unwrap();
    shell.execute("log-level loud").unwrap();
    assert_eq!(
        client.calls(),
        [
            "log-level Warn NetIf",
            "create hostif [(\"index\", \"1\"), (\"fec-type\", \"rs\")] 0x10",
            "remove 0x11",
        ]
    );
    assert_eq!(
        rendered(shell),
        "oid: 0x20\ninvalid argument. candidates: [debug, info, notice, warn, error, critical]\n"
    );
}

#[test]
fn interrupt_ends_monitor_and_the_batch_continues() {
    let ctrl_c = Arc::new(AtomicBool::new(false));
    let client = Rc::new(RecordingClient {
        ctrl_c: Some(Arc::clone(&ctrl_c)),
        ..RecordingClient::default()
    });
    let mut shell = shell(&client).with_interrupt(ctrl_c);
    shell
        .run_batch("module 1; netif 0; monitor; set tx t; get tx")
        .unwrap();
    assert_eq!(
        client.calls(),
        [
            "monitor 0x11 notify",
            "set 0x11 tx-enable=true",
            "get 0x11 tx-enable json=false",
        ]
    );
    assert_eq!(rendered(shell), "oper-status | ready\n\ntrue\n");
}

#[test]
fn metadata_failure_keeps_the_previous_context() {
    let client = Rc::new(RecordingClient {
        metadata_failure: Some(TaiError::status(0x1, "boom")),
        ..RecordingClient::default()
    });
    let mut shell = shell(&client);
    let root = shell.context();
    assert_eq!(shell.execute("module 1").unwrap(), CommandStatus::Continue);
    assert!(Rc::ptr_eq(&shell.context(), &root));
    assert_eq!(shell.prompt(), "> ");
    assert_eq!(rendered(shell), "err: boom (code 1)\n");
}
