use crate::coordinator::{self, Coordinator};
use crate::iam::{self, Iam2Client};
use crate::output;
use crate::registers::{RegisterIndex, UnknownRegister};
use crate::value::{InvalidValue, Value};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    UnknownRegister(#[from] UnknownRegister),
    #[error("could not connect to the unit")]
    Client(#[source] iam::Error),
    #[error("could not set up the coordinator")]
    Setup(#[source] coordinator::Error<iam::Error>),
    #[error("could not write the register")]
    Write(#[source] coordinator::Error<iam::Error>),
    #[error("{0} is not a valid value")]
    ParseValue(#[source] InvalidValue, String),
    #[error("could not output the results")]
    Output(#[source] output::Error),
    #[error("could not wait for the interrupt signal")]
    Signal(#[source] std::io::Error),
}

fn register_names(names: &[String]) -> Result<Vec<RegisterIndex>, Error> {
    Ok(names.iter().map(|n| crate::registers::lookup(n)).collect::<Result<_, _>>()?)
}

async fn connect(
    iam: &iam::Args,
    coordinator: &coordinator::Args,
) -> Result<Coordinator<Iam2Client>, Error> {
    let client = Iam2Client::new(iam).map_err(Error::Client)?;
    let mut coordinator = Coordinator::with_args(client, coordinator);
    coordinator.setup().await.map_err(Error::Setup)?;
    Ok(coordinator)
}

const VALUE_HEADERS: [&str; 4] = ["Address", "Name", "Value", "Description"];

#[derive(serde::Serialize)]
struct ValueRecord {
    address: u16,
    name: &'static str,
    value: Option<Value>,
}

fn output_value(
    output: &mut output::Output,
    register: RegisterIndex,
    value: Option<Value>,
) -> Result<(), Error> {
    output
        .result(
            || {
                vec![
                    register.address().to_string(),
                    register.name().to_string(),
                    value.map(|v| v.to_string()).unwrap_or_default(),
                    register.description().to_string(),
                ]
            },
            || ValueRecord { address: register.address(), name: register.name(), value },
        )
        .map_err(Error::Output)
}

pub mod registers {
    use super::Error;
    use crate::output;
    use crate::registers::{DataType, Mode, RegisterIndex, all_registers};

    /// Search and output known registers.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Only list registers whose name, description or address contains this.
        filter: Option<String>,
        #[clap(flatten)]
        output: output::Args,
    }

    #[derive(serde::Serialize)]
    pub struct RegisterSchema {
        pub address: u16,
        pub name: &'static str,
        pub mode: Mode,
        pub signed: bool,
        pub boolean: bool,
        pub scale: u8,
        pub minimum: Option<f64>,
        pub maximum: Option<f64>,
        pub high_word: Option<u16>,
        pub description: &'static str,
    }

    impl From<RegisterIndex> for RegisterSchema {
        fn from(register: RegisterIndex) -> Self {
            let data_type: DataType = register.data_type();
            let domain = |raw: i32| f64::from(raw) / f64::from(data_type.scale_factor());
            RegisterSchema {
                address: register.address(),
                name: register.name(),
                mode: register.mode(),
                signed: data_type.is_signed(),
                boolean: data_type.is_boolean(),
                scale: data_type.scale(),
                minimum: register.minimum().map(domain),
                maximum: register.maximum().map(domain),
                high_word: register.high_word().map(|r| r.address()),
                description: register.description(),
            }
        }
    }

    impl RegisterSchema {
        pub fn is_match(&self, pattern: &str) -> bool {
            let pattern = pattern.to_uppercase();
            self.name.contains(&pattern)
                || self.description.to_uppercase().contains(&pattern)
                || self.address.to_string().contains(&pattern)
        }
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let mut output = args.output.to_output().map_err(Error::Output)?;
        output
            .headers(&["Address", "Name", "Mode", "Type", "Min", "Max", "Description"])
            .map_err(Error::Output)?;
        for register in all_registers() {
            let schema = RegisterSchema::from(register);
            if args.filter.as_deref().is_some_and(|f| !schema.is_match(f)) {
                continue;
            }
            output
                .result(
                    || {
                        vec![
                            schema.address.to_string(),
                            schema.name.to_string(),
                            schema.mode.to_string(),
                            register.data_type().to_string(),
                            schema.minimum.map(|v| v.to_string()).unwrap_or_default(),
                            schema.maximum.map(|v| v.to_string()).unwrap_or_default(),
                            schema.description.to_string(),
                        ]
                    },
                    || &schema,
                )
                .map_err(Error::Output)?;
        }
        output.commit().map_err(Error::Output)
    }
}

pub mod info {
    use super::{Error, connect};
    use crate::{coordinator, iam, output};

    /// Identify the unit and its model.
    #[derive(clap::Parser)]
    pub struct Args {
        #[clap(flatten)]
        iam: iam::Args,
        #[clap(flatten)]
        coordinator: coordinator::Args,
        #[clap(flatten)]
        output: output::Args,
    }

    pub async fn run(args: Args) -> Result<(), Error> {
        let coordinator = connect(&args.iam, &args.coordinator).await?;
        let mut fields = vec![("Model", coordinator.model().as_str())];
        if let Some(info) = coordinator.device_info() {
            fields.extend([
                ("MAC address", info.mac_address.as_str()),
                ("Serial number", info.serial_number.as_str()),
                ("MB model", info.mb_model.as_str()),
                ("MB hardware version", info.mb_hw_version.as_str()),
                ("MB software version", info.mb_sw_version.as_str()),
                ("IAM software version", info.iam_sw_version.as_str()),
            ]);
        }
        let mut output = args.output.to_output().map_err(Error::Output)?;
        output.headers(&["Field", "Value"]).map_err(Error::Output)?;
        for (field, value) in fields {
            output
                .result(
                    || vec![field.to_string(), value.to_string()],
                    || serde_json::json!({ "field": field, "value": value }),
                )
                .map_err(Error::Output)?;
        }
        output.commit().map_err(Error::Output)
    }
}

pub mod read {
    use super::{Error, VALUE_HEADERS, connect, output_value, register_names};
    use crate::{coordinator, iam, output};

    /// Read the current values of registers.
    #[derive(clap::Parser)]
    pub struct Args {
        #[clap(flatten)]
        iam: iam::Args,
        #[clap(flatten)]
        coordinator: coordinator::Args,
        #[clap(flatten)]
        output: output::Args,
        /// Names of the registers to read.
        #[arg(required = true)]
        registers: Vec<String>,
    }

    pub async fn run(args: Args) -> Result<(), Error> {
        let registers = register_names(&args.registers)?;
        let mut coordinator = connect(&args.iam, &args.coordinator).await?;
        let mut changed = false;
        for &register in &registers {
            changed |= coordinator.require(register);
        }
        if changed {
            if let Err(e) = coordinator.refresh().await {
                tracing::warn!(
                    error = (&e as &(dyn std::error::Error + 'static)),
                    "could not read the requested registers"
                );
            }
        }
        let mut output = args.output.to_output().map_err(Error::Output)?;
        output.headers(&VALUE_HEADERS).map_err(Error::Output)?;
        for register in registers {
            let value = coordinator.get(register, true);
            output_value(&mut output, register, value)?;
        }
        output.commit().map_err(Error::Output)
    }
}

pub mod write {
    use super::{Error, connect};
    use crate::registers;
    use crate::value::Value;
    use crate::{coordinator, iam};

    /// Write a value to a register.
    ///
    /// The value is given in the register's units, e.g. degrees Celsius for temperatures, and
    /// is clamped to the register's valid range.
    #[derive(clap::Parser)]
    pub struct Args {
        #[clap(flatten)]
        iam: iam::Args,
        #[clap(flatten)]
        coordinator: coordinator::Args,
        /// Name of the register to write.
        register: String,
        /// The value to write. Boolean registers accept `true`/`false`, `on`/`off` or `1`/`0`.
        #[arg(allow_hyphen_values = true)]
        value: String,
    }

    pub async fn run(args: Args) -> Result<(), Error> {
        let register = registers::lookup(&args.register)?;
        let value =
            Value::parse_for(register, &args.value).map_err(|e| Error::ParseValue(e, args.value))?;
        if !register.mode().is_writable() {
            tracing::warn!(register = register.name(), "register is documented as read-only");
        }
        let coordinator = connect(&args.iam, &args.coordinator).await?;
        coordinator.set(register, value).await.map_err(Error::Write)
    }
}

pub mod poll {
    use super::{Error, VALUE_HEADERS, connect, output_value, register_names};
    use crate::{coordinator, iam, output};
    use std::ops::ControlFlow;

    /// Periodically read registers until interrupted.
    ///
    /// Every refresh outputs the values of all the requested registers.
    #[derive(clap::Parser)]
    pub struct Args {
        #[clap(flatten)]
        iam: iam::Args,
        #[clap(flatten)]
        coordinator: coordinator::Args,
        #[clap(flatten)]
        output: output::Args,
        /// Names of the registers to poll.
        #[arg(required = true)]
        registers: Vec<String>,
    }

    pub async fn run(args: Args) -> Result<(), Error> {
        let registers = register_names(&args.registers)?;
        let mut coordinator = connect(&args.iam, &args.coordinator).await?;
        for &register in &registers {
            coordinator.require(register);
        }
        let mut output = args.output.to_output().map_err(Error::Output)?;
        output.headers(&VALUE_HEADERS).map_err(Error::Output)?;
        let mut failure = None;
        let poll = coordinator.run(|coordinator, _| {
            for &register in &registers {
                let value = coordinator.get(register, true);
                if let Err(e) = output_value(&mut output, register, value) {
                    failure = Some(e);
                    return ControlFlow::Break(());
                }
            }
            match output.checkpoint() {
                Ok(()) => ControlFlow::Continue(()),
                Err(e) => {
                    failure = Some(Error::Output(e));
                    ControlFlow::Break(())
                }
            }
        });
        tokio::select! {
            _ = poll => {},
            interrupted = tokio::signal::ctrl_c() => interrupted.map_err(Error::Signal)?,
        }
        if let Some(e) = failure {
            return Err(e);
        }
        output.commit().map_err(Error::Output)
    }
}
