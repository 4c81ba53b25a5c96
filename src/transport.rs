use crate::registers::RegisterIndex;
use crate::snapshot::Snapshot;

/// A JSON object returned by one of the informational endpoints (e.g. `menu`).
pub type Endpoint = serde_json::Map<String, serde_json::Value>;

/// The means of talking to a SAVE unit.
///
/// Implementations own the actual network protocol; the coordinator only ever deals in whole
/// register read-outs and single register writes.
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch one of the unit's informational endpoints, such as `menu` or `unit_version`.
    async fn fetch_endpoint(&self, name: &str) -> Result<Endpoint, Self::Error>;

    /// Read out the given registers.
    ///
    /// Registers the unit does not implement may be absent from the returned snapshot, this is
    /// not an error.
    async fn fetch_registers(&self, registers: &[RegisterIndex]) -> Result<Snapshot, Self::Error>;

    /// Write a raw value, as produced by [`crate::value::encode`], to a register.
    async fn write_register(&self, register: RegisterIndex, value: i32) -> Result<(), Self::Error>;
}
