//! Keeps a view of the unit's registers up to date.
//!
//! The [`Coordinator`] owns everything that changes over a session: the set of registers being
//! polled, the most recent read-out, and which missing registers have already been reported.
//! It is driven from a single task. Reads never touch the network and never fail, they degrade
//! to "no value" instead. Setup, refreshes and writes go through the [`Transport`] and report
//! their failures to the caller.

use crate::model::Model;
use crate::polling::PollingSet;
use crate::registers::{self, RegisterIndex};
use crate::snapshot::Snapshot;
use crate::transport::{Endpoint, Transport};
use crate::value::{self, InvalidValue, Value};
use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

const MENU: &str = "menu";
const UNIT_VERSION: &str = "unit_version";

/// Registers that must be polled from the start, regardless of what has been read so far.
const MANDATORY_REGISTERS: [RegisterIndex; 2] =
    [registers::FUNCTION_ACTIVE_HEATER, registers::FUNCTION_ACTIVE_COOLER];

#[derive(thiserror::Error, Debug)]
pub enum Error<E: std::error::Error + 'static> {
    #[error("could not fetch the `{1}` endpoint")]
    FetchEndpoint(#[source] E, &'static str),
    #[error("the `{0}` endpoint response has no `{1}` field")]
    MissingIdentity(&'static str, &'static str),
    #[error("could not read registers from the unit")]
    Refresh(#[source] E),
    #[error("refusing to write an invalid value")]
    InvalidValue(#[source] InvalidValue),
    #[error("could not write {value} to register {register}")]
    Write {
        #[source]
        source: E,
        register: RegisterIndex,
        value: i32,
    },
}

#[derive(clap::Parser, Clone, Debug)]
#[group(id = "coordinator::Args")]
pub struct Args {
    /// How often to read out the polled registers from the unit.
    #[arg(long, default_value = "10s")]
    pub update_interval: humantime::Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    SettingUp,
    Ready,
    Refreshing,
    /// The latest refresh failed. The previous snapshot, if any, is still readable.
    Failed,
}

/// Identity of the unit, as reported by the `menu` and `unit_version` endpoints.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DeviceInfo {
    pub mac_address: String,
    pub serial_number: String,
    pub mb_hw_version: String,
    pub mb_model: String,
    pub mb_sw_version: String,
    pub iam_sw_version: String,
}

impl DeviceInfo {
    fn from_endpoints<E: std::error::Error + 'static>(
        menu: &Endpoint,
        unit_version: &Endpoint,
    ) -> Result<Self, Error<E>> {
        Ok(Self {
            mac_address: identity_field(menu, MENU, "mac")?,
            serial_number: identity_field(unit_version, UNIT_VERSION, "System Serial Number")?,
            mb_hw_version: identity_field(unit_version, UNIT_VERSION, "MB HW version")?,
            mb_model: identity_field(unit_version, UNIT_VERSION, "MB Model")?,
            mb_sw_version: identity_field(unit_version, UNIT_VERSION, "MB SW version")?,
            iam_sw_version: identity_field(unit_version, UNIT_VERSION, "IAM SW version")?,
        })
    }
}

fn identity_field<E: std::error::Error + 'static>(
    endpoint: &Endpoint,
    endpoint_name: &'static str,
    key: &'static str,
) -> Result<String, Error<E>> {
    match endpoint.get(key) {
        None | Some(serde_json::Value::Null) => Err(Error::MissingIdentity(endpoint_name, key)),
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
    }
}

pub struct Coordinator<T> {
    transport: T,
    update_interval: Duration,
    state: State,
    polling: PollingSet,
    snapshot: Option<Snapshot>,
    /// Names of registers whose absence has already been logged.
    logged_missing: BTreeSet<&'static str>,
    device_info: Option<DeviceInfo>,
    model: OnceCell<Model>,
    last_update_success: bool,
}

impl<T: Transport> Coordinator<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            state: State::Uninitialized,
            polling: PollingSet::new(),
            snapshot: None,
            logged_missing: BTreeSet::new(),
            device_info: None,
            model: OnceCell::new(),
            last_update_success: false,
        }
    }

    pub fn with_args(transport: T, args: &Args) -> Self {
        Self::new(transport).with_update_interval(*args.update_interval)
    }

    pub fn with_update_interval(mut self, update_interval: Duration) -> Self {
        self.update_interval = update_interval;
        self
    }

    /// Identify the unit, start polling the mandatory registers and read them out once.
    ///
    /// On failure the coordinator goes back to [`State::Uninitialized`] and setup may be
    /// attempted again.
    pub async fn setup(&mut self) -> Result<(), Error<T::Error>> {
        self.state = State::SettingUp;
        let result = self.setup_inner().await;
        if result.is_err() {
            self.state = State::Uninitialized;
        }
        result
    }

    async fn setup_inner(&mut self) -> Result<(), Error<T::Error>> {
        let (menu, unit_version) =
            futures::try_join!(self.fetch_endpoint(MENU), self.fetch_endpoint(UNIT_VERSION))?;
        let device_info = DeviceInfo::from_endpoints(&menu, &unit_version)?;
        info!(
            mac = device_info.mac_address,
            serial = device_info.serial_number,
            mb_sw_version = device_info.mb_sw_version,
            iam_sw_version = device_info.iam_sw_version,
            "identified the unit"
        );
        self.device_info = Some(device_info);
        let _ = self.model();
        for register in MANDATORY_REGISTERS {
            self.require(register);
        }
        self.refresh().await
    }

    async fn fetch_endpoint(&self, name: &'static str) -> Result<Endpoint, Error<T::Error>> {
        self.transport.fetch_endpoint(name).await.map_err(|e| Error::FetchEndpoint(e, name))
    }

    /// Read out every polled register, replacing the snapshot on success.
    ///
    /// A failure leaves the previous snapshot in place.
    pub async fn refresh(&mut self) -> Result<(), Error<T::Error>> {
        self.state = State::Refreshing;
        match self.transport.fetch_registers(self.polling.registers()).await {
            Ok(snapshot) => {
                debug!(polled = self.polling.len(), received = snapshot.len(), "refreshed");
                self.snapshot = Some(snapshot);
                self.last_update_success = true;
                self.state = State::Ready;
                Ok(())
            }
            Err(e) => {
                self.last_update_success = false;
                self.state = State::Failed;
                Err(Error::Refresh(e))
            }
        }
    }

    /// Refresh every update interval, reporting each outcome to `on_update`, until it breaks.
    ///
    /// Refreshes never overlap: if one takes longer than the interval, the next one is delayed.
    /// A failed refresh is logged and retried on the next tick.
    pub async fn run<F>(&mut self, mut on_update: F)
    where
        F: FnMut(&mut Self, Result<(), Error<T::Error>>) -> ControlFlow<()>,
    {
        let mut interval = tokio::time::interval(self.update_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let result = self.refresh().await;
            if let Err(e) = &result {
                warn!(
                    error = (e as &(dyn std::error::Error + 'static)),
                    "refreshing register values failed"
                );
            }
            if on_update(self, result).is_break() {
                return;
            }
        }
    }

    /// Start polling `register` (and its high word, if any) on every refresh.
    ///
    /// Returns `true` if the register was not polled yet.
    pub fn require(&mut self, register: RegisterIndex) -> bool {
        self.polling.require(register)
    }

    /// Read the current value of `register`, or `None` if it is not known.
    ///
    /// This does two things: it decodes the value from the latest snapshot, and it also
    /// requires the register, so that anything read once keeps being polled from then on.
    /// With `log_missing`, an unavailable register is reported the first time only.
    pub fn get(&mut self, register: RegisterIndex, log_missing: bool) -> Option<Value> {
        self.require(register);
        let decoded = match &self.snapshot {
            None => None,
            Some(snapshot) => Some(value::decode(register, snapshot)),
        };
        match decoded {
            Some(Ok(value)) => Some(value),
            None => {
                if log_missing && self.logged_missing.insert(register.name()) {
                    warn!(
                        register = register.name(),
                        "no register values have been read from the unit yet"
                    );
                }
                None
            }
            Some(Err(missing)) => {
                if log_missing && self.logged_missing.insert(register.name()) {
                    debug!(
                        register = register.name(),
                        model = %self.model(),
                        reason = %missing,
                        "register unavailable, possibly not supported by this model"
                    );
                }
                None
            }
        }
    }

    /// [`Self::get`] with missing register logging, substituting `default` for unknown values.
    pub fn get_or(&mut self, register: RegisterIndex, default: Value) -> Value {
        self.get(register, true).unwrap_or(default)
    }

    /// Whether the latest snapshot has a word for `register`.
    ///
    /// The high word of a 32-bit register is not checked.
    pub fn is_available(&self, register: RegisterIndex) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.contains(register))
    }

    /// Encode `value` for `register` and write it to the unit.
    pub async fn set(&self, register: RegisterIndex, value: Value) -> Result<(), Error<T::Error>> {
        let raw = value::encode(register, value).map_err(Error::InvalidValue)?;
        debug!(register = register.name(), %value, raw, "writing register");
        self.transport.write_register(register, raw).await.map_err(|source| Error::Write {
            source,
            register,
            value: raw,
        })
    }

    /// The detected unit model.
    ///
    /// Resolved from the `MB Model` reported during setup on first access, and cached for the
    /// lifetime of the coordinator. Accessing it before setup resolves to [`Model::Unknown`].
    pub fn model(&self) -> Model {
        *self.model.get_or_init(|| {
            let model_string = self.device_info.as_ref().map(|d| d.mb_model.as_str());
            let model = Model::from_model_string(model_string);
            info!(%model, from = ?model_string, "detected SystemAIR model");
            model
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.device_info.as_ref()
    }

    pub fn polling(&self) -> &PollingSet {
        &self.polling
    }

    pub fn last_update_success(&self) -> bool {
        self.last_update_success
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::lookup;
    use std::collections::BTreeMap;
    use tracing_test::traced_test;

    #[derive(thiserror::Error, Debug)]
    #[error("the unit did not respond")]
    struct Unreachable;

    /// A unit that implements only the registers in `words`.
    struct FakeUnit {
        model: &'static str,
        words: BTreeMap<u16, u16>,
    }

    impl Transport for FakeUnit {
        type Error = Unreachable;

        async fn fetch_endpoint(&self, name: &str) -> Result<Endpoint, Unreachable> {
            let value = match name {
                "menu" => serde_json::json!({ "mac": "00:11:22:33:44:55" }),
                "unit_version" => serde_json::json!({
                    "System Serial Number": "123456",
                    "MB HW version": 3,
                    "MB Model": self.model,
                    "MB SW version": "1.23.0",
                    "IAM SW version": "2.5.1",
                }),
                _ => return Err(Unreachable),
            };
            Ok(value.as_object().cloned().unwrap_or_default())
        }

        async fn fetch_registers(&self, registers: &[RegisterIndex]) -> Result<Snapshot, Unreachable> {
            Ok(registers
                .iter()
                .filter_map(|r| self.words.get(&r.snapshot_key()).map(|w| (r.snapshot_key(), *w)))
                .collect())
        }

        async fn write_register(&self, _: RegisterIndex, _: i32) -> Result<(), Unreachable> {
            Ok(())
        }
    }

    fn unit(model: &'static str, words: &[(&str, u16)]) -> FakeUnit {
        let words = words.iter().map(|(n, w)| (lookup(n).unwrap().snapshot_key(), *w)).collect();
        FakeUnit { model, words }
    }

    #[tokio::test]
    #[traced_test]
    async fn missing_registers_are_reported_once() {
        let mut coordinator = Coordinator::new(unit("VTR-300", &[("SENSOR_OAT", 215)]));
        let oat = lookup("SENSOR_OAT").unwrap();
        let sat = lookup("SENSOR_SAT").unwrap();
        assert_eq!(coordinator.get(oat, true), None);
        assert_eq!(coordinator.get(oat, true), None);
        coordinator.setup().await.unwrap();
        assert_eq!(coordinator.get(oat, true), Some(Value::Number(21.5)));
        assert_eq!(coordinator.get(sat, true), None);
        assert_eq!(coordinator.get(sat, true), None);
        assert_eq!(coordinator.get_or(sat, Value::Number(0.0)), Value::Number(0.0));
        logs_assert(|lines: &[&str]| {
            let no_snapshot = lines.iter().filter(|l| l.contains("no register values")).count();
            let unavailable = lines.iter().filter(|l| l.contains("register unavailable")).count();
            match (no_snapshot, unavailable) {
                (1, 1) => Ok(()),
                counts => Err(format!("unexpected number of reports: {counts:?}")),
            }
        });
    }

    #[tokio::test]
    #[traced_test]
    async fn silent_reads_do_not_use_up_the_report() {
        let mut coordinator = Coordinator::new(unit("VTR-300", &[]));
        coordinator.setup().await.unwrap();
        let sat = lookup("SENSOR_SAT").unwrap();
        assert_eq!(coordinator.get(sat, false), None);
        assert!(!logs_contain("register unavailable"));
        assert_eq!(coordinator.get(sat, true), None);
        assert!(logs_contain("register unavailable"));
    }

    #[tokio::test]
    #[traced_test]
    async fn model_is_detected_once() {
        let mut coordinator = Coordinator::new(unit("SAVE VTR300/B", &[]));
        coordinator.setup().await.unwrap();
        assert_eq!(coordinator.model(), Model::Vtr300);
        assert_eq!(coordinator.model(), Model::Vtr300);
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|l| l.contains("detected SystemAIR model")).count() {
                1 => Ok(()),
                n => Err(format!("model detection logged {n} times")),
            }
        });
    }

    #[test]
    fn model_before_setup_is_unknown() {
        let coordinator = Coordinator::new(unit("VTR-500", &[]));
        assert_eq!(coordinator.model(), Model::Unknown);
        assert_eq!(coordinator.state(), State::Uninitialized);
        assert!(!coordinator.last_update_success());
    }

    #[test]
    fn identity_accepts_numbers_and_rejects_nulls() {
        let endpoint = serde_json::json!({ "a": 3, "b": "x", "c": null });
        let endpoint = endpoint.as_object().cloned().unwrap();
        assert_eq!(identity_field::<Unreachable>(&endpoint, "e", "a").unwrap(), "3");
        assert_eq!(identity_field::<Unreachable>(&endpoint, "e", "b").unwrap(), "x");
        assert!(matches!(
            identity_field::<Unreachable>(&endpoint, "e", "c"),
            Err(Error::MissingIdentity("e", "c"))
        ));
        assert!(matches!(
            identity_field::<Unreachable>(&endpoint, "e", "d"),
            Err(Error::MissingIdentity("e", "d"))
        ));
    }
}
