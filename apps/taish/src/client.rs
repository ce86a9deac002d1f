// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: RPC client boundary between the shell and a TAI management daemon.
// Author: Lukas Bower

//! RPC client boundary between the shell and a TAI management daemon.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;

use serde::Deserialize;
use taish_core::AttributeDescriptor;
use thiserror::Error;

/// Attribute ids above this value belong to the vendor-custom range.
pub const CUSTOM_RANGE_START: u32 = 0x1000_0000;

/// Usage string the daemon reports for notification attributes.
pub const NOTIFICATION_USAGE: &str = "<notification>";

/// TAI object types addressable from the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// Optical module.
    Module,
    /// Network (line side) interface.
    NetIf,
    /// Host (client side) interface.
    HostIf,
}

impl ObjectType {
    /// Every object type in canonical order.
    pub const ALL: [ObjectType; 3] = [ObjectType::Module, ObjectType::NetIf, ObjectType::HostIf];

    /// Lowercase label used on the command line.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::NetIf => "netif",
            Self::HostIf => "hostif",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ObjectType {
    type Err = TaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| TaiError::UnknownObjectType(s.to_owned()))
    }
}

/// Reference to one live object on the daemon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectHandle {
    /// Type of the object.
    pub object_type: ObjectType,
    /// Daemon-assigned object id.
    pub oid: u64,
}

impl ObjectHandle {
    /// Construct a handle.
    #[must_use]
    pub fn new(object_type: ObjectType, oid: u64) -> Self {
        Self { object_type, oid }
    }
}

/// Attribute metadata as reported by the daemon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeMetadata {
    /// Numeric attribute id.
    pub attr_id: u32,
    /// Short name used on the command line.
    pub short_name: String,
    /// Whether writes are rejected.
    pub is_readonly: bool,
    /// Value domain hint.
    pub usage: String,
}

impl AttributeMetadata {
    /// Project onto the descriptor consumed by the completion engine.
    #[must_use]
    pub fn descriptor(&self) -> AttributeDescriptor {
        AttributeDescriptor::new(self.short_name.clone(), self.is_readonly, self.usage.clone())
    }

    /// Whether the attribute lives in the vendor-custom id range.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.attr_id > CUSTOM_RANGE_START
    }

    /// Whether the attribute carries notifications.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.usage == NOTIFICATION_USAGE
    }
}

/// Index and id of an interface below a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Interface index within the module.
    pub index: u32,
    /// Daemon-assigned object id.
    pub oid: u64,
}

/// One module slot as reported by `list`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSummary {
    /// Location key of the slot.
    pub location: String,
    /// Whether hardware is present in the slot.
    pub present: bool,
    /// Object id, zero while the module has not been created.
    pub oid: u64,
    /// Created network interfaces.
    pub netifs: Vec<ObjectSummary>,
    /// Created host interfaces.
    pub hostifs: Vec<ObjectSummary>,
}

impl ModuleSummary {
    /// Every object id in this slot, module first.
    #[must_use]
    pub fn oids(&self) -> Vec<u64> {
        std::iter::once(self.oid)
            .chain(self.netifs.iter().map(|n| n.oid))
            .chain(self.hostifs.iter().map(|h| h.oid))
            .collect()
    }
}

/// One attribute carried by a notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotifiedAttribute {
    /// Numeric attribute id.
    pub attr_id: u32,
    /// Serialized value.
    pub value: String,
}

/// Notification delivered by a monitor subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Object that raised the notification.
    pub oid: u64,
    /// Attributes reported.
    pub attrs: Vec<NotifiedAttribute>,
}

/// Daemon log verbosity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warn,
    Error,
    Critical,
}

impl LogLevel {
    /// Command-line labels in canonical order.
    pub const LABELS: [&'static str; 6] = ["debug", "info", "notice", "warn", "error", "critical"];
}

impl FromStr for LogLevel {
    type Err = TaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "notice" => Ok(Self::Notice),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => Err(TaiError::InvalidLogLevel(other.to_owned())),
        }
    }
}

/// Which adapter API a log level applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ApiScope {
    Module,
    NetIf,
    HostIf,
    Unspecified,
}

impl ApiScope {
    /// Command-line labels in canonical order.
    pub const LABELS: [&'static str; 4] = ["module", "netif", "hostif", "unspecified"];
}

impl FromStr for ApiScope {
    type Err = TaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "module" => Ok(Self::Module),
            "netif" => Ok(Self::NetIf),
            "hostif" => Ok(Self::HostIf),
            "unspecified" => Ok(Self::Unspecified),
            other => Err(TaiError::InvalidApiScope(other.to_owned())),
        }
    }
}

/// Failures reported by a [`Client`].
#[derive(Debug, Error)]
pub enum TaiError {
    /// The daemon rejected the operation with a TAI status code.
    #[error("{message}")]
    Status {
        /// TAI status code.
        code: u32,
        /// Daemon supplied description.
        message: String,
    },
    /// No slot with this location exists.
    #[error("no module {0} found")]
    UnknownModule(String),
    /// The slot is empty.
    #[error("module {0} not present")]
    ModuleNotPresent(String),
    /// The slot holds hardware that has not been created yet.
    #[error("module {0} not created yet")]
    ModuleNotCreated(String),
    /// `monitor` was asked to follow a non-notification attribute.
    #[error("the type of attribute {0} is not notification")]
    NotNotification(String),
    /// Unrecognised log level label.
    #[error("invalid log level: {0}. choose from [debug, info, notice, warn, error, critical]")]
    InvalidLogLevel(String),
    /// Unrecognised API scope label.
    #[error("invalid api type: {0}. choose from [module, netif, hostif, unspecified]")]
    InvalidApiScope(String),
    /// Unrecognised object type label.
    #[error("invalid object type: {0}. choose from [module, netif, hostif]")]
    UnknownObjectType(String),
}

impl TaiError {
    /// Build a status failure.
    pub fn status(code: u32, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }
}

/// Result alias for client operations.
pub type TaiResult<T> = Result<T, TaiError>;

/// Operations the shell needs from a TAI management daemon.
///
/// Calls block until the daemon answers. `monitor` blocks until the
/// notification stream ends or `cancel` is raised.
pub trait Client {
    /// Short transport label used in diagnostics.
    fn kind(&self) -> &'static str {
        "unknown"
    }

    /// Every module slot, ordered by location.
    fn list(&self) -> TaiResult<Vec<ModuleSummary>>;

    /// Attribute metadata for an object type in declaration order.
    fn list_attribute_metadata(&self, object_type: ObjectType) -> TaiResult<Vec<AttributeMetadata>>;

    /// Read an attribute, optionally rendered as JSON.
    fn get(&self, object: ObjectHandle, attr: &str, json: bool) -> TaiResult<String>;

    /// Write an attribute.
    fn set(&self, object: ObjectHandle, attr: &str, value: &str) -> TaiResult<()>;

    /// Describe what values an attribute supports on this object.
    fn get_attribute_capability(&self, object: ObjectHandle, attr: &str) -> TaiResult<String>;

    /// Create an object, returning its id. Interfaces name their module via `module_oid`.
    fn create(
        &self,
        object_type: ObjectType,
        attrs: &[(String, String)],
        module_oid: u64,
    ) -> TaiResult<u64>;

    /// Remove an object.
    fn remove(&self, oid: u64) -> TaiResult<()>;

    /// Stream notifications of `attr` into `callback`, values optionally as JSON.
    fn monitor(
        &self,
        object: ObjectHandle,
        attr: &str,
        json: bool,
        callback: &mut dyn FnMut(&Notification),
        cancel: &AtomicBool,
    ) -> TaiResult<()>;

    /// Change the daemon's log verbosity.
    fn set_log_level(&self, level: LogLevel, api: ApiScope) -> TaiResult<()>;
}

/// Look up a module slot that is present and created.
pub fn find_module(client: &dyn Client, location: &str) -> TaiResult<ModuleSummary> {
    let module = client
        .list()?
        .into_iter()
        .find(|m| m.location == location)
        .ok_or_else(|| TaiError::UnknownModule(location.to_owned()))?;
    if !module.present {
        return Err(TaiError::ModuleNotPresent(location.to_owned()));
    }
    if module.oid == 0 {
        return Err(TaiError::ModuleNotCreated(location.to_owned()));
    }
    Ok(module)
}

/// Parse an object id with optional `0x`, `0o` or `0b` radix prefix.
pub fn parse_oid(text: &str) -> Result<u64, std::num::ParseIntError> {
    let lower = text.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2)
    } else {
        lower.parse()
    }
}
