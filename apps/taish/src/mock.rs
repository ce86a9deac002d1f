// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: In-memory TAI daemon backing the shell when no remote daemon is used.
// Author: Lukas Bower

//! In-memory TAI daemon.
//!
//! [`MockClient`] keeps module slots, live objects and their attribute values
//! in process. It validates writes against attribute metadata the same way a
//! daemon would and replays queued notifications on `monitor`. The default
//! seed models one created module with its interfaces, one present but
//! uncreated module and one empty slot; [`MockClient::from_fixture`] replaces
//! the seed with a TOML description.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::Deserialize;
use serde_json::{Number, Value};
use taish_core::value_candidates;

use crate::client::{
    ApiScope, AttributeMetadata, Client, LogLevel, ModuleSummary, NotifiedAttribute,
    Notification, ObjectHandle, ObjectSummary, ObjectType, TaiError, TaiResult,
};

/// Generic failure.
pub const STATUS_FAILURE: u32 = 0x1;
/// Operation not supported in the current state.
pub const STATUS_NOT_SUPPORTED: u32 = 0x2;
/// Malformed request.
pub const STATUS_INVALID_PARAMETER: u32 = 0x5;
/// Object already exists.
pub const STATUS_ITEM_ALREADY_EXISTS: u32 = 0x6;
/// Object does not exist.
pub const STATUS_ITEM_NOT_FOUND: u32 = 0x7;
/// Attribute cannot be written.
pub const STATUS_INVALID_ATTRIBUTE: u32 = 0x1_0000;
/// Value outside the attribute's domain.
pub const STATUS_INVALID_ATTR_VALUE: u32 = 0x2_0000;
/// Attribute unknown for the object type.
pub const STATUS_UNKNOWN_ATTRIBUTE: u32 = 0x4_0000;

#[derive(Debug, Clone)]
struct Slot {
    location: String,
    present: bool,
    oid: u64,
    netif_capacity: u32,
    hostif_capacity: u32,
    netifs: Vec<ObjectSummary>,
    hostifs: Vec<ObjectSummary>,
}

impl Slot {
    fn empty(location: &str, present: bool, netifs: u32, hostifs: u32) -> Self {
        Self {
            location: location.to_owned(),
            present,
            oid: 0,
            netif_capacity: netifs,
            hostif_capacity: hostifs,
            netifs: Vec::new(),
            hostifs: Vec::new(),
        }
    }

    fn summary(&self) -> ModuleSummary {
        ModuleSummary {
            location: self.location.clone(),
            present: self.present,
            oid: self.oid,
            netifs: self.netifs.clone(),
            hostifs: self.hostifs.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct LiveObject {
    object_type: ObjectType,
    values: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct QueuedNotification {
    object_type: ObjectType,
    attribute: String,
    attrs: Vec<NotifiedAttribute>,
}

#[derive(Debug, Default)]
struct MockState {
    metadata: BTreeMap<ObjectType, Vec<AttributeMetadata>>,
    defaults: BTreeMap<(ObjectType, String), String>,
    slots: Vec<Slot>,
    objects: BTreeMap<u64, LiveObject>,
    notifications: Vec<QueuedNotification>,
    next_oid: u64,
    log_level: Option<(LogLevel, ApiScope)>,
}

/// In-process stand-in for a TAI management daemon.
#[derive(Debug)]
pub struct MockClient {
    state: RefCell<MockState>,
}

impl Default for MockClient {
    fn default() -> Self {
        let mut state = MockState {
            next_oid: 1,
            ..MockState::default()
        };
        for object_type in ObjectType::ALL {
            for (attr_id, name, readonly, usage, default) in default_attributes(object_type) {
                state.metadata.entry(object_type).or_default().push(AttributeMetadata {
                    attr_id: *attr_id,
                    short_name: (*name).to_owned(),
                    is_readonly: *readonly,
                    usage: (*usage).to_owned(),
                });
                if let Some(value) = default {
                    state
                        .defaults
                        .insert((object_type, (*name).to_owned()), (*value).to_owned());
                }
            }
        }
        state.slots = vec![
            Slot::empty("1", true, 1, 2),
            Slot::empty("2", true, 1, 2),
            Slot::empty("3", false, 1, 2),
        ];
        state.notifications = default_notifications(&state.metadata);
        if let Err(err) = state.instantiate_slot(0, &[]) {
            debug!("mock seed left slot 1 uncreated: {err}");
        }
        Self {
            state: RefCell::new(state),
        }
    }
}

type SeedAttribute = (u32, &'static str, bool, &'static str, Option<&'static str>);

fn default_attributes(object_type: ObjectType) -> &'static [SeedAttribute] {
    match object_type {
        ObjectType::Module => &[
            (1, "location", true, "<chararray>", None),
            (2, "vendor-name", true, "<chararray>", Some("ACME")),
            (3, "oper-status", true, "[unknown|initialize|ready]", Some("ready")),
            (4, "admin-status", false, "[unknown|down|up]", Some("up")),
            (5, "temp", true, "<float>", Some("38.5")),
            (6, "power", true, "<float>", Some("11.2")),
            (7, "num-host-interfaces", true, "<uint32>", None),
            (8, "num-network-interfaces", true, "<uint32>", None),
            (9, "notify", false, "<notification>", None),
        ],
        ObjectType::NetIf => &[
            (1, "index", true, "<uint32>", None),
            (2, "tx-enable", false, "<bool>", Some("true")),
            (3, "tx-laser-freq", false, "<uint64>", Some("193500000000000")),
            (4, "output-power", false, "<float>", Some("1.0")),
            (5, "current-output-power", true, "<float>", Some("-3.2")),
            (
                6,
                "modulation-format",
                false,
                "[unknown|bpsk|dp-bpsk|qpsk|dp-qpsk|8-qam|dp-8-qam|16-qam|dp-16-qam]",
                Some("dp-qpsk"),
            ),
            (7, "oper-status", true, "[unknown|initialize|ready]", Some("ready")),
            (8, "notify", false, "<notification>", None),
            (0x1000_0001, "custom-list", false, "<uint32 list>", Some("1,2,3")),
        ],
        ObjectType::HostIf => &[
            (1, "index", true, "<uint32>", None),
            (2, "fec-type", false, "[none|rs|fc]", Some("rs")),
            (3, "tx-align-status", true, "<bitfield>", Some("")),
            (4, "notify", false, "<notification>", None),
        ],
    }
}

fn default_notifications(
    metadata: &BTreeMap<ObjectType, Vec<AttributeMetadata>>,
) -> Vec<QueuedNotification> {
    let id = |object_type: ObjectType, name: &str| {
        metadata
            .get(&object_type)
            .and_then(|attrs| attrs.iter().find(|m| m.short_name == name))
            .map_or(0, |m| m.attr_id)
    };
    let attr = |attr_id: u32, value: &str| NotifiedAttribute {
        attr_id,
        value: value.to_owned(),
    };
    vec![
        QueuedNotification {
            object_type: ObjectType::Module,
            attribute: "notify".to_owned(),
            attrs: vec![attr(id(ObjectType::Module, "oper-status"), "ready")],
        },
        QueuedNotification {
            object_type: ObjectType::Module,
            attribute: "notify".to_owned(),
            attrs: vec![attr(id(ObjectType::Module, "temp"), "39.0")],
        },
        QueuedNotification {
            object_type: ObjectType::NetIf,
            attribute: "notify".to_owned(),
            attrs: vec![
                attr(id(ObjectType::NetIf, "oper-status"), "ready"),
                attr(id(ObjectType::NetIf, "current-output-power"), "-3.1"),
            ],
        },
        QueuedNotification {
            object_type: ObjectType::NetIf,
            attribute: "notify".to_owned(),
            attrs: vec![attr(0x2000_0001, "1")],
        },
    ]
}

fn initial_value(usage: &str) -> String {
    if usage == "<notification>" {
        return String::new();
    }
    value_candidates(usage)
        .into_iter()
        .next()
        .unwrap_or_else(|| "0".to_owned())
}

fn not_found(oid: u64) -> TaiError {
    TaiError::status(STATUS_ITEM_NOT_FOUND, format!("object 0x{oid:x} not found"))
}

fn unknown_attribute(attr: &str) -> TaiError {
    TaiError::status(
        STATUS_UNKNOWN_ATTRIBUTE,
        format!("unknown attribute {attr}"),
    )
}

/// Render a textual attribute value as the JSON a daemon would emit.
#[must_use]
pub fn json_value(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = text.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Ok(uint) = text.parse::<u64>() {
        return Value::Number(uint.into());
    }
    if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(text.to_owned())
}

fn encode(text: &str, json: bool) -> TaiResult<String> {
    if !json {
        return Ok(text.to_owned());
    }
    serde_json::to_string(&json_value(text))
        .map_err(|err| TaiError::status(STATUS_FAILURE, format!("json encoding failed: {err}")))
}

impl MockState {
    fn alloc_oid(&mut self) -> u64 {
        let oid = self.next_oid;
        self.next_oid += 1;
        oid
    }

    fn meta(&self, object_type: ObjectType, attr: &str) -> TaiResult<&AttributeMetadata> {
        self.metadata
            .get(&object_type)
            .and_then(|attrs| attrs.iter().find(|m| m.short_name == attr))
            .ok_or_else(|| unknown_attribute(attr))
    }

    fn object(&self, handle: ObjectHandle) -> TaiResult<&LiveObject> {
        self.objects
            .get(&handle.oid)
            .filter(|object| object.object_type == handle.object_type)
            .ok_or_else(|| not_found(handle.oid))
    }

    fn check_value(&self, object_type: ObjectType, attr: &str, value: &str) -> TaiResult<()> {
        let meta = self.meta(object_type, attr)?;
        let domain = value_candidates(&meta.usage);
        if !domain.is_empty() && !domain.iter().any(|v| v == value) {
            return Err(TaiError::status(
                STATUS_INVALID_ATTR_VALUE,
                format!("invalid value {value} for {attr}. choose from [{}]", domain.join(", ")),
            ));
        }
        Ok(())
    }

    fn spawn(
        &mut self,
        object_type: ObjectType,
        attrs: &[(String, String)],
    ) -> TaiResult<u64> {
        for (name, value) in attrs {
            self.check_value(object_type, name, value)?;
        }
        let mut values = BTreeMap::new();
        for meta in self.metadata.get(&object_type).into_iter().flatten() {
            let value = self
                .defaults
                .get(&(object_type, meta.short_name.clone()))
                .cloned()
                .unwrap_or_else(|| initial_value(&meta.usage));
            values.insert(meta.short_name.clone(), value);
        }
        for (name, value) in attrs {
            values.insert(name.clone(), value.clone());
        }
        let oid = self.alloc_oid();
        self.objects.insert(oid, LiveObject { object_type, values });
        Ok(oid)
    }

    fn instantiate_slot(&mut self, slot: usize, attrs: &[(String, String)]) -> TaiResult<u64> {
        let (location, netifs, hostifs) = {
            let slot = &self.slots[slot];
            (slot.location.clone(), slot.netif_capacity, slot.hostif_capacity)
        };
        let mut attrs = attrs.to_vec();
        attrs.retain(|(name, _)| name != "location");
        let oid = self.spawn(ObjectType::Module, &attrs)?;
        if let Some(object) = self.objects.get_mut(&oid) {
            object.values.insert("location".to_owned(), location);
            object
                .values
                .insert("num-network-interfaces".to_owned(), netifs.to_string());
            object
                .values
                .insert("num-host-interfaces".to_owned(), hostifs.to_string());
        }
        self.slots[slot].oid = oid;
        for index in 0..netifs {
            self.attach_interface(ObjectType::NetIf, oid, index, &[])?;
        }
        for index in 0..hostifs {
            self.attach_interface(ObjectType::HostIf, oid, index, &[])?;
        }
        Ok(oid)
    }

    fn attach_interface(
        &mut self,
        object_type: ObjectType,
        module_oid: u64,
        index: u32,
        attrs: &[(String, String)],
    ) -> TaiResult<u64> {
        let slot = self
            .slots
            .iter()
            .position(|s| s.oid == module_oid && module_oid != 0)
            .ok_or_else(|| not_found(module_oid))?;
        let (capacity, existing) = match object_type {
            ObjectType::NetIf => (self.slots[slot].netif_capacity, &self.slots[slot].netifs),
            _ => (self.slots[slot].hostif_capacity, &self.slots[slot].hostifs),
        };
        if index >= capacity {
            return Err(TaiError::status(
                STATUS_INVALID_PARAMETER,
                format!("{object_type} index {index} out of range (max {capacity})"),
            ));
        }
        if existing.iter().any(|i| i.index == index) {
            return Err(TaiError::status(
                STATUS_ITEM_ALREADY_EXISTS,
                format!("{object_type} {index} already exists"),
            ));
        }
        let mut attrs = attrs.to_vec();
        attrs.retain(|(name, _)| name != "index");
        let oid = self.spawn(object_type, &attrs)?;
        if let Some(object) = self.objects.get_mut(&oid) {
            object.values.insert("index".to_owned(), index.to_string());
        }
        let list = match object_type {
            ObjectType::NetIf => &mut self.slots[slot].netifs,
            _ => &mut self.slots[slot].hostifs,
        };
        list.push(ObjectSummary { index, oid });
        list.sort_by_key(|i| i.index);
        Ok(oid)
    }
}

impl MockClient {
    /// Load a daemon description from a TOML fixture file.
    pub fn from_fixture(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        Self::from_fixture_str(&text)
            .with_context(|| format!("invalid fixture {}", path.display()))
    }

    /// Build a daemon from fixture TOML text.
    ///
    /// Sections left out of the fixture keep the default seed.
    pub fn from_fixture_str(text: &str) -> Result<Self> {
        let fixture: Fixture = toml::from_str(text).context("invalid fixture TOML")?;
        let seeded = Self::default().state.into_inner();
        let mut state = MockState {
            next_oid: 1,
            ..MockState::default()
        };

        if fixture.attribute.is_empty() {
            state.metadata = seeded.metadata;
            state.defaults = seeded.defaults;
        } else {
            for attr in fixture.attribute {
                let list = state.metadata.entry(attr.object).or_default();
                if list.iter().any(|m| m.short_name == attr.name) {
                    return Err(anyhow!("duplicate {} attribute {}", attr.object, attr.name));
                }
                list.push(AttributeMetadata {
                    attr_id: attr.id,
                    short_name: attr.name.clone(),
                    is_readonly: attr.readonly,
                    usage: attr.usage,
                });
                if let Some(value) = attr.default {
                    state.defaults.insert((attr.object, attr.name), value);
                }
            }
        }

        if fixture.notification.is_empty() {
            state.notifications = default_notifications(&state.metadata);
        } else {
            for entry in fixture.notification {
                let mut attrs = Vec::with_capacity(entry.values.len());
                for value in entry.values {
                    let attr_id = match (value.id, value.name.as_deref()) {
                        (Some(id), _) => id,
                        (None, Some(name)) => state
                            .meta(entry.object, name)
                            .map(|m| m.attr_id)
                            .map_err(|_| anyhow!("unknown {} attribute {name}", entry.object))?,
                        (None, None) => {
                            return Err(anyhow!("notification value needs a name or an id"))
                        }
                    };
                    attrs.push(NotifiedAttribute {
                        attr_id,
                        value: value.value,
                    });
                }
                state.notifications.push(QueuedNotification {
                    object_type: entry.object,
                    attribute: entry.attribute,
                    attrs,
                });
            }
        }

        if fixture.module.is_empty() {
            return Err(anyhow!("fixture declares no modules"));
        }
        let mut modules = fixture.module;
        modules.sort_by(|a, b| a.location.cmp(&b.location));
        for pair in modules.windows(2) {
            if pair[0].location == pair[1].location {
                return Err(anyhow!("duplicate module location {}", pair[0].location));
            }
        }
        for module in &modules {
            state
                .slots
                .push(Slot::empty(&module.location, module.present, module.netifs, module.hostifs));
        }
        for (index, module) in modules.iter().enumerate() {
            if module.present && module.created {
                state
                    .instantiate_slot(index, &[])
                    .map_err(|err| anyhow!("module {}: {err}", module.location))?;
            }
        }
        debug!(
            "mock daemon seeded with {} module slots and {} notifications",
            state.slots.len(),
            state.notifications.len()
        );
        Ok(Self {
            state: RefCell::new(state),
        })
    }

    /// Log level most recently applied through [`Client::set_log_level`].
    pub fn log_level(&self) -> Option<(LogLevel, ApiScope)> {
        self.state.borrow().log_level
    }

    /// Queue a notification raised by every object of `object_type` on `attribute`.
    pub fn push_notification(
        &self,
        object_type: ObjectType,
        attribute: &str,
        attrs: Vec<NotifiedAttribute>,
    ) {
        self.state.borrow_mut().notifications.push(QueuedNotification {
            object_type,
            attribute: attribute.to_owned(),
            attrs,
        });
    }
}

impl Client for MockClient {
    fn kind(&self) -> &'static str {
        "mock"
    }

    fn list(&self) -> TaiResult<Vec<ModuleSummary>> {
        Ok(self.state.borrow().slots.iter().map(Slot::summary).collect())
    }

    fn list_attribute_metadata(&self, object_type: ObjectType) -> TaiResult<Vec<AttributeMetadata>> {
        Ok(self
            .state
            .borrow()
            .metadata
            .get(&object_type)
            .cloned()
            .unwrap_or_default())
    }

    fn get(&self, object: ObjectHandle, attr: &str, json: bool) -> TaiResult<String> {
        let state = self.state.borrow();
        let live = state.object(object)?;
        state.meta(object.object_type, attr)?;
        let value = live.values.get(attr).ok_or_else(|| {
            TaiError::status(STATUS_NOT_SUPPORTED, format!("{attr} has no value"))
        })?;
        encode(value, json)
    }

    fn set(&self, object: ObjectHandle, attr: &str, value: &str) -> TaiResult<()> {
        let mut state = self.state.borrow_mut();
        state.object(object)?;
        if state.meta(object.object_type, attr)?.is_readonly {
            return Err(TaiError::status(
                STATUS_INVALID_ATTRIBUTE,
                format!("{attr} is read-only"),
            ));
        }
        state.check_value(object.object_type, attr, value)?;
        debug!("mock set 0x{:x} {attr}={value}", object.oid);
        if let Some(live) = state.objects.get_mut(&object.oid) {
            live.values.insert(attr.to_owned(), value.to_owned());
        }
        Ok(())
    }

    fn get_attribute_capability(&self, object: ObjectHandle, attr: &str) -> TaiResult<String> {
        let state = self.state.borrow();
        state.object(object)?;
        let meta = state.meta(object.object_type, attr)?;
        let domain = value_candidates(&meta.usage);
        let access = if meta.is_readonly { "read-only" } else { "read-write" };
        if domain.is_empty() {
            Ok(format!("{access} {}", meta.usage))
        } else {
            Ok(format!("{access} supported values: [{}]", domain.join(", ")))
        }
    }

    fn create(
        &self,
        object_type: ObjectType,
        attrs: &[(String, String)],
        module_oid: u64,
    ) -> TaiResult<u64> {
        let mut state = self.state.borrow_mut();
        match object_type {
            ObjectType::Module => {
                let location = attrs
                    .iter()
                    .find(|(name, _)| name == "location")
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| {
                        TaiError::status(STATUS_INVALID_PARAMETER, "location attribute is required")
                    })?;
                let slot = state
                    .slots
                    .iter()
                    .position(|s| s.location == location)
                    .ok_or_else(|| {
                        TaiError::status(STATUS_ITEM_NOT_FOUND, format!("no module at {location}"))
                    })?;
                if !state.slots[slot].present {
                    return Err(TaiError::status(
                        STATUS_NOT_SUPPORTED,
                        format!("module {location} not present"),
                    ));
                }
                if state.slots[slot].oid != 0 {
                    return Err(TaiError::status(
                        STATUS_ITEM_ALREADY_EXISTS,
                        format!("module {location} already created"),
                    ));
                }
                state.instantiate_slot(slot, attrs)
            }
            ObjectType::NetIf | ObjectType::HostIf => {
                let index = attrs
                    .iter()
                    .find(|(name, _)| name == "index")
                    .and_then(|(_, value)| value.parse::<u32>().ok())
                    .ok_or_else(|| {
                        TaiError::status(STATUS_INVALID_PARAMETER, "index attribute is required")
                    })?;
                state.attach_interface(object_type, module_oid, index, attrs)
            }
        }
    }

    fn remove(&self, oid: u64) -> TaiResult<()> {
        let mut state = self.state.borrow_mut();
        let object_type = state
            .objects
            .get(&oid)
            .map(|object| object.object_type)
            .ok_or_else(|| not_found(oid))?;
        match object_type {
            ObjectType::Module => {
                if let Some(slot) = state.slots.iter_mut().find(|s| s.oid == oid) {
                    if !slot.netifs.is_empty() || !slot.hostifs.is_empty() {
                        return Err(TaiError::status(
                            STATUS_INVALID_PARAMETER,
                            format!("module 0x{oid:x} still has interfaces"),
                        ));
                    }
                    slot.oid = 0;
                }
            }
            ObjectType::NetIf | ObjectType::HostIf => {
                for slot in &mut state.slots {
                    slot.netifs.retain(|i| i.oid != oid);
                    slot.hostifs.retain(|i| i.oid != oid);
                }
            }
        }
        state.objects.remove(&oid);
        debug!("mock removed 0x{oid:x}");
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
        let queued: Vec<Vec<NotifiedAttribute>> = {
            let state = self.state.borrow();
            state.object(object)?;
            let meta = state.meta(object.object_type, attr)?;
            if !meta.is_notification() {
                return Err(TaiError::NotNotification(attr.to_owned()));
            }
            state
                .notifications
                .iter()
                .filter(|n| n.object_type == object.object_type && n.attribute == attr)
                .map(|n| n.attrs.clone())
                .collect()
        };
        for attrs in queued {
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            let mut encoded = Vec::with_capacity(attrs.len());
            for attr in attrs {
                encoded.push(NotifiedAttribute {
                    attr_id: attr.attr_id,
                    value: encode(&attr.value, json)?,
                });
            }
            callback(&Notification {
                oid: object.oid,
                attrs: encoded,
            });
        }
        Ok(())
    }

    fn set_log_level(&self, level: LogLevel, api: ApiScope) -> TaiResult<()> {
        self.state.borrow_mut().log_level = Some((level, api));
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    #[serde(default)]
    module: Vec<FixtureModule>,
    #[serde(default)]
    attribute: Vec<FixtureAttribute>,
    #[serde(default)]
    notification: Vec<FixtureNotification>,
}

fn default_true() -> bool {
    true
}

fn default_netifs() -> u32 {
    1
}

fn default_hostifs() -> u32 {
    2
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureModule {
    location: String,
    #[serde(default = "default_true")]
    present: bool,
    #[serde(default = "default_true")]
    created: bool,
    #[serde(default = "default_netifs")]
    netifs: u32,
    #[serde(default = "default_hostifs")]
    hostifs: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureAttribute {
    object: ObjectType,
    id: u32,
    name: String,
    #[serde(default)]
    readonly: bool,
    #[serde(default)]
    usage: String,
    default: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureNotification {
    object: ObjectType,
    #[serde(default = "default_notify")]
    attribute: String,
    values: Vec<FixtureValue>,
}

fn default_notify() -> String {
    "notify".to_owned()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureValue {
    name: Option<String>,
    id: Option<u32>,
    value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn netif0(client: &MockClient) -> ObjectHandle {
        let module = &client.list().unwrap()[0];
        ObjectHandle::new(ObjectType::NetIf, module.netifs[0].oid)
    }

    #[test]
    fn default_seed_has_created_absent_and_uncreated_slots() {
        let client = MockClient::default();
        let modules = client.list().unwrap();
        assert_eq!(modules.len(), 3);
        assert!(modules[0].present && modules[0].oid != 0);
        assert_eq!(modules[0].netifs.len(), 1);
        assert_eq!(modules[0].hostifs.len(), 2);
        assert!(modules[1].present && modules[1].oid == 0);
        assert!(!modules[2].present);
    }

    #[test]
    fn set_rejects_read_only_and_out_of_domain_values() {
        let client = MockClient::default();
        let netif = netif0(&client);
        match client.set(netif, "oper-status", "ready") {
            Err(TaiError::Status { code, .. }) => assert_eq!(code, STATUS_INVALID_ATTRIBUTE),
            other => panic!("unexpected {other:?}"),
        }
        match client.set(netif, "tx-enable", "maybe") {
            Err(TaiError::Status { code, .. }) => assert_eq!(code, STATUS_INVALID_ATTR_VALUE),
            other => panic!("unexpected {other:?}"),
        }
        client.set(netif, "tx-enable", "false").unwrap();
        assert_eq!(client.get(netif, "tx-enable", false).unwrap(), "false");
        assert_eq!(client.get(netif, "tx-enable", true).unwrap(), "false");
        assert_eq!(client.get(netif, "modulation-format", true).unwrap(), "\"dp-qpsk\"");
    }

    #[test]
    fn create_and_remove_follow_slot_rules() {
        let client = MockClient::default();
        let attrs = vec![("location".to_owned(), "2".to_owned())];
        let oid = client.create(ObjectType::Module, &attrs, 0).unwrap();
        assert!(client.create(ObjectType::Module, &attrs, 0).is_err());
        assert_eq!(client.list().unwrap()[1].oid, oid);

        let missing = vec![("location".to_owned(), "3".to_owned())];
        assert!(client.create(ObjectType::Module, &missing, 0).is_err());

        assert!(client.remove(oid).is_err(), "interfaces still attached");
        for summary in client.list().unwrap()[1].oids().into_iter().skip(1) {
            client.remove(summary).unwrap();
        }
        client.remove(oid).unwrap();
        assert_eq!(client.list().unwrap()[1].oid, 0);

        let netif = vec![("index".to_owned(), "0".to_owned())];
        let module = client.list().unwrap()[0].oid;
        assert!(client.create(ObjectType::NetIf, &netif, module).is_err());
    }

    #[test]
    fn monitor_replays_queue_and_honours_cancel() {
        let client = MockClient::default();
        let netif = netif0(&client);
        let mut seen = Vec::new();
        client
            .monitor(netif, "notify", false, &mut |n| seen.push(n.clone()), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].oid, netif.oid);

        let mut count = 0;
        client
            .monitor(netif, "notify", false, &mut |_| count += 1, &AtomicBool::new(true))
            .unwrap();
        assert_eq!(count, 0);

        assert!(matches!(
            client.monitor(netif, "tx-enable", false, &mut |_| {}, &AtomicBool::new(false)),
            Err(TaiError::NotNotification(_))
        ));
    }

    #[test]
    fn pushed_notifications_follow_the_seed() {
        let client = MockClient::default();
        let netif = netif0(&client);
        client.push_notification(
            ObjectType::NetIf,
            "notify",
            vec![NotifiedAttribute {
                attr_id: 0x2000_0001,
                value: "7".to_owned(),
            }],
        );
        let mut seen = Vec::new();
        client
            .monitor(netif, "notify", true, &mut |n| seen.push(n.clone()), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].attrs[0].value, "7");
    }

    #[test]
    fn log_level_is_recorded() {
        let client = MockClient::default();
        assert_eq!(client.log_level(), None);
        client.set_log_level(LogLevel::Error, ApiScope::HostIf).unwrap();
        assert_eq!(client.log_level(), Some((LogLevel::Error, ApiScope::HostIf)));
    }

    #[test]
    fn fixture_replaces_seed() {
        let client = MockClient::from_fixture_str(
            r#"
            [[module]]
            location = "a"
            netifs = 2
            hostifs = 0

            [[module]]
            location = "b"
            present = false

            [[attribute]]
            object = "netif"
            id = 1
            name = "mode"
            usage = "[fast|slow]"

            [[notification]]
            object = "netif"
            values = [{ id = 7, value = "x" }]
            "#,
        )
        .unwrap();
        let modules = client.list().unwrap();
        assert_eq!(modules[0].netifs.len(), 2);
        assert!(modules[0].hostifs.is_empty());
        assert!(!modules[1].present);
        let netifs = client.list_attribute_metadata(ObjectType::NetIf).unwrap();
        assert_eq!(netifs.len(), 1);
        let handle = ObjectHandle::new(ObjectType::NetIf, modules[0].netifs[1].oid);
        assert_eq!(client.get(handle, "mode", false).unwrap(), "fast");
    }

    #[test]
    fn fixture_rejects_unknown_keys() {
        assert!(MockClient::from_fixture_str("[[module]]\nlocation = \"1\"\nbogus = 1\n").is_err());
        assert!(MockClient::from_fixture_str("").is_err());
    }

    #[test]
    fn json_values_follow_their_text() {
        assert_eq!(json_value("true"), Value::Bool(true));
        assert_eq!(json_value("-3"), Value::Number((-3).into()));
        assert_eq!(json_value("ready"), Value::String("ready".to_owned()));
        assert!(json_value("1.5").is_f64());
    }
}
