//! The catalog of SAVE unit registers this crate knows how to decode.
//!
//! Every register is described once in the `for_each_register` table. The table is expanded
//! into a handful of parallel constant slices indexed by [`RegisterIndex`], and is checked at
//! compile time for ordering and for dangling 32-bit partners.

#[derive(Clone, Copy, Debug, serde::Serialize, PartialEq, Eq)]
pub struct DataType {
    scale: u8,
    signed: bool,
    boolean: bool,
}

impl DataType {
    // Convenience aliases for the tabulated `for_each_register` definition below.
    pub const U16: Self = Self { scale: 1, signed: false, boolean: false };
    pub const I16: Self = Self { scale: 1, signed: true, boolean: false };
    /// Degrees Celsius multiplied by 10.
    pub const CEL: Self = Self { scale: 10, signed: true, boolean: false };
    /// Specific humidity in g/kg multiplied by 10.
    pub const SPH: Self = Self { scale: 10, signed: false, boolean: false };
    pub const BIT: Self = Self { scale: 1, signed: false, boolean: true };

    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    pub const fn is_boolean(&self) -> bool {
        self.boolean
    }

    /// The raw scale as written in the catalog. May be zero.
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// The divisor applied to decoded values. A zero scale is treated as 1.
    pub const fn scale_factor(&self) -> u8 {
        if self.scale == 0 { 1 } else { self.scale }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.boolean {
            return f.write_str("BOOL");
        }
        f.write_str(if self.signed { "S/" } else { "U/" })?;
        f.write_fmt(format_args!("{}", self.scale_factor()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct Mode(u8);

impl serde::Serialize for Mode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.0 & Self::R.0 == 0 { "-" } else { "R" })?;
        f.write_str(if self.0 & Self::W.0 == 0 { "-" } else { "W" })?;
        Ok(())
    }
}

impl Mode {
    pub const R: Self = Self(1 << 0);
    pub const W: Self = Self(1 << 1);
    pub const RW: Self = Self(Self::R.0 | Self::W.0);
    const R_: Self = Self::R;

    pub const fn is_writable(&self) -> bool {
        self.0 & Self::W.0 != 0
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("`{0}` is not a known register name")]
pub struct UnknownRegister(pub String);

/// A handle to an entry in the register catalog.
///
/// Only ever constructed for registers that exist, so all the accessors are infallible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterIndex(usize);

impl RegisterIndex {
    pub const fn from_address(address: u16) -> Option<RegisterIndex> {
        let (mut low, mut high) = (0, ADDRESSES.len());
        while low < high {
            let mid = low + (high - low) / 2;
            if ADDRESSES[mid] < address {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        if low < ADDRESSES.len() && ADDRESSES[low] == address { Some(Self(low)) } else { None }
    }

    pub const fn from_name(name: &str) -> Option<RegisterIndex> {
        let mut index = 0;
        while index < NAMES.len() {
            if const_str_eq(NAMES[index], name) {
                return Some(Self(index));
            }
            index += 1;
        }
        None
    }

    /// The 1-based logical register number, as listed in the vendor documentation.
    pub const fn address(&self) -> u16 {
        ADDRESSES[self.0]
    }

    /// The zero-based index under which the device reports this register.
    pub const fn snapshot_key(&self) -> u16 {
        ADDRESSES[self.0] - 1
    }

    pub const fn name(&self) -> &'static str {
        NAMES[self.0]
    }

    pub const fn description(&self) -> &'static str {
        DESCRIPTIONS[self.0]
    }

    pub const fn mode(&self) -> Mode {
        MODES[self.0]
    }

    pub const fn data_type(&self) -> DataType {
        DATA_TYPES[self.0]
    }

    /// The register holding the high word when this register is the low word of a 32-bit
    /// quantity.
    pub const fn high_word(&self) -> Option<RegisterIndex> {
        match HIGH_WORDS[self.0] {
            Some(address) => RegisterIndex::from_address(address),
            None => None,
        }
    }

    /// Lower write bound, in raw register units.
    pub const fn minimum(&self) -> Option<i32> {
        MINIMUM_VALUES[self.0]
    }

    /// Upper write bound, in raw register units.
    pub const fn maximum(&self) -> Option<i32> {
        MAXIMUM_VALUES[self.0]
    }
}

impl std::fmt::Display for RegisterIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn lookup(name: &str) -> Result<RegisterIndex, UnknownRegister> {
    RegisterIndex::from_name(name).ok_or_else(|| UnknownRegister(name.to_string()))
}

/// All catalog entries, in ascending address order.
pub fn all_registers() -> impl Iterator<Item = RegisterIndex> {
    (0..ADDRESSES.len()).map(RegisterIndex)
}

const fn const_str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut index = 0;
    while index < a.len() {
        if a[index] != b[index] {
            return false;
        }
        index += 1;
    }
    true
}

macro_rules! for_each_register {
    ($m:ident) => {
        $m! {
            1001: U16, R_, "DEMC_RH_HIGHEST", min = 0, max = 100
                => "Highest value of all RH sensors";
            1002: U16, R_, "DEMC_CO2_HIGHEST", min = 0, max = 2000
                => "Highest value of all CO2 sensors";
            1033: U16, RW, "DEMC_RH_SETTINGS_SP_SUMMER", min = 10, max = 100
                => "RH demand control set point, summer";
            1034: U16, RW, "DEMC_RH_SETTINGS_SP_WINTER", min = 10, max = 100
                => "RH demand control set point, winter";
            1035: BIT, RW, "DEMC_RH_SETTINGS_ON_OFF"
                => "RH demand control allowed";
            1039: U16, R_, "SUMMER_WINTER", min = 0, max = 1
                => "Season used by demand control. 0=Summer, 1=Winter";
            1043: U16, RW, "DEMC_CO2_SETTINGS_SP", min = 100, max = 2000
                => "CO2 demand control set point";
            1044: BIT, RW, "DEMC_CO2_SETTINGS_ON_OFF"
                => "CO2 demand control allowed";
            1101: U16, RW, "USERMODE_HOLIDAY_TIME", min = 1, max = 365
                => "Duration of user mode Holiday, days";
            1102: U16, RW, "USERMODE_AWAY_TIME", min = 1, max = 72
                => "Duration of user mode Away, hours";
            1103: U16, RW, "USERMODE_FIREPLACE_TIME", min = 1, max = 60
                => "Duration of user mode Fireplace, minutes";
            1104: U16, RW, "USERMODE_REFRESH_TIME", min = 1, max = 240
                => "Duration of user mode Refresh, minutes";
            1105: U16, RW, "USERMODE_CROWDED_TIME", min = 1, max = 8
                => "Duration of user mode Crowded, hours";
            1111: U16, R_, "USERMODE_REMAINING_TIME_L", high = 1112
                => "Remaining time of the active timed user mode, seconds";
            1112: U16, R_, "USERMODE_REMAINING_TIME_H"
                => "Remaining time of the active timed user mode, higher 16 bits";
            1123: U16, R_, "IAQ_LEVEL", min = 0, max = 2
                => "Indoor air quality level. 0=Economic, 1=Good, 2=Improving";
            1131: U16, RW, "USERMODE_MANUAL_AIRFLOW_LEVEL_SAF", min = 0, max = 4
                => "Fan speed level for mode Manual. 0=Off, 2=Low, 3=Normal, 4=High";
            1135: U16, RW, "USERMODE_CROWDED_AIRFLOW_LEVEL_SAF", min = 3, max = 5
                => "Supply fan level for mode Crowded";
            1136: U16, RW, "USERMODE_CROWDED_AIRFLOW_LEVEL_EAF", min = 3, max = 5
                => "Extract fan level for mode Crowded";
            1137: U16, RW, "USERMODE_REFRESH_AIRFLOW_LEVEL_SAF", min = 3, max = 5
                => "Supply fan level for mode Refresh";
            1138: U16, RW, "USERMODE_REFRESH_AIRFLOW_LEVEL_EAF", min = 3, max = 5
                => "Extract fan level for mode Refresh";
            1139: U16, RW, "USERMODE_FIREPLACE_AIRFLOW_LEVEL_SAF", min = 3, max = 5
                => "Supply fan level for mode Fireplace";
            1140: U16, RW, "USERMODE_FIREPLACE_AIRFLOW_LEVEL_EAF", min = 1, max = 3
                => "Extract fan level for mode Fireplace";
            1141: U16, RW, "USERMODE_AWAY_AIRFLOW_LEVEL_SAF", min = 0, max = 3
                => "Supply fan level for mode Away";
            1142: U16, RW, "USERMODE_AWAY_AIRFLOW_LEVEL_EAF", min = 0, max = 3
                => "Extract fan level for mode Away";
            1143: U16, RW, "USERMODE_HOLIDAY_AIRFLOW_LEVEL_SAF", min = 0, max = 3
                => "Supply fan level for mode Holiday";
            1144: U16, RW, "USERMODE_HOLIDAY_AIRFLOW_LEVEL_EAF", min = 0, max = 3
                => "Extract fan level for mode Holiday";
            1151: CEL, RW, "USERMODE_CROWDED_T_OFFSET", min = -100, max = 0
                => "Temperature set point offset for user mode Crowded";
            1161: U16, R_, "USERMODE_MODE", min = 0, max = 12
                => "Active user mode. 0=Auto, 1=Manual, 2=Crowded, 3=Refresh, 4=Fireplace, 5=Away, \
                 6=Holiday, 7=Cooker Hood, 8=Vacuum Cleaner, 9=CDI1, 10=CDI2, 11=CDI3, \
                 12=Pressure Guard";
            1162: U16, RW, "USERMODE_HMI_CHANGE_REQUEST", min = 0, max = 7
                => "Requested user mode. 1=Auto, 2=Manual, 3=Crowded, 4=Refresh, 5=Fireplace, \
                 6=Away, 7=Holiday";
            1351: BIT, R_, "SPEED_FANS_RUNNING"
                => "Fans are running";
            1353: BIT, RW, "FAN_MANUAL_STOP_ALLOWED"
                => "Manual fan stop allowed";
            1401: U16, RW, "FAN_LEVEL_SAF_MIN_PERCENTAGE", min = 16, max = 100
                => "Supply fan speed at level Minimum, percent";
            1402: U16, RW, "FAN_LEVEL_EAF_MIN_PERCENTAGE", min = 16, max = 100
                => "Extract fan speed at level Minimum, percent";
            1403: U16, RW, "FAN_LEVEL_SAF_LOW_PERCENTAGE", min = 16, max = 100
                => "Supply fan speed at level Low, percent";
            1404: U16, RW, "FAN_LEVEL_EAF_LOW_PERCENTAGE", min = 16, max = 100
                => "Extract fan speed at level Low, percent";
            1405: U16, RW, "FAN_LEVEL_SAF_NORMAL_PERCENTAGE", min = 16, max = 100
                => "Supply fan speed at level Normal, percent";
            1406: U16, RW, "FAN_LEVEL_EAF_NORMAL_PERCENTAGE", min = 16, max = 100
                => "Extract fan speed at level Normal, percent";
            1407: U16, RW, "FAN_LEVEL_SAF_HIGH_PERCENTAGE", min = 16, max = 100
                => "Supply fan speed at level High, percent";
            1408: U16, RW, "FAN_LEVEL_EAF_HIGH_PERCENTAGE", min = 16, max = 100
                => "Extract fan speed at level High, percent";
            1409: U16, RW, "FAN_LEVEL_SAF_MAX_PERCENTAGE", min = 16, max = 100
                => "Supply fan speed at level Maximum, percent";
            1410: U16, RW, "FAN_LEVEL_EAF_MAX_PERCENTAGE", min = 16, max = 100
                => "Extract fan speed at level Maximum, percent";
            2001: CEL, RW, "TC_SP", min = 120, max = 300
                => "Temperature set point";
            2031: U16, RW, "TC_CONTROL_MODE", min = 0, max = 2
                => "Temperature control mode. 0=Supply, 1=Room, 2=Extract";
            2054: CEL, R_, "TC_SP_SATC", min = 120, max = 300
                => "Supply air temperature set point in effect";
            2069: I16, R_, "SATC_PI_OUTPUT", min = 0, max = 100
                => "Supply air temperature controller output";
            2149: U16, R_, "PWM_TRIAC_OUTPUT", min = 0, max = 100
                => "Heater output, percent";
            2211: SPH, R_, "ROTOR_EA_SPEC_HUMIDITY", min = 0
                => "Extract air specific humidity";
            2212: SPH, R_, "ROTOR_OA_SPEC_HUMIDITY", min = 0
                => "Outdoor air specific humidity at assumed 90% RH";
            2504: CEL, RW, "ECO_T_Y1_OFFSET", min = 0, max = 100
                => "Heater set point offset while in eco mode";
            2505: BIT, RW, "ECO_MODE_ON_OFF"
                => "Eco mode enabled";
            2506: BIT, R_, "ECO_FUNCTION_ACTIVE"
                => "Eco mode is currently active";
            3101: BIT, R_, "FUNCTION_ACTIVE_COOLER"
                => "Cooling is active";
            3102: BIT, R_, "FUNCTION_ACTIVE_FREE_COOLING"
                => "Free cooling is active";
            3103: BIT, R_, "FUNCTION_ACTIVE_HEATER"
                => "Heating is active";
            3104: BIT, R_, "FUNCTION_ACTIVE_DEFROSTING"
                => "Defrosting is active";
            3105: BIT, R_, "FUNCTION_ACTIVE_HEAT_RECOVERY"
                => "Heat recovery is active";
            3106: BIT, R_, "FUNCTION_ACTIVE_COOLING_RECOVERY"
                => "Cooling recovery is active";
            3107: BIT, R_, "FUNCTION_ACTIVE_MOISTURE_TRANSFER"
                => "Moisture transfer is active";
            3108: BIT, R_, "FUNCTION_ACTIVE_SECONDARY_AIR"
                => "Secondary air is active";
            3109: BIT, R_, "FUNCTION_ACTIVE_VACUUM_CLEANER"
                => "Vacuum cleaner function is active";
            3110: BIT, R_, "FUNCTION_ACTIVE_COOKER_HOOD"
                => "Cooker hood function is active";
            3111: BIT, R_, "FUNCTION_ACTIVE_USER_LOCK"
                => "User lock is active";
            3112: BIT, R_, "FUNCTION_ACTIVE_ECO_MODE"
                => "Eco mode function is active";
            3113: BIT, R_, "FUNCTION_ACTIVE_HEATER_COOL_DOWN"
                => "Heater cool down is active";
            3114: BIT, R_, "FUNCTION_ACTIVE_PRESSURE_GUARD"
                => "Pressure guard is active";
            3115: BIT, R_, "FUNCTION_ACTIVE_CDI_1"
                => "Configurable digital input 1 is active";
            3116: BIT, R_, "FUNCTION_ACTIVE_CDI_2"
                => "Configurable digital input 2 is active";
            3117: BIT, R_, "FUNCTION_ACTIVE_CDI_3"
                => "Configurable digital input 3 is active";
            4101: BIT, RW, "FREE_COOLING_ON_OFF"
                => "Free cooling enabled";
            4102: CEL, RW, "FREE_COOLING_OUTDOOR_DAYTIME_T", min = 120, max = 300
                => "Minimum daytime outdoor temperature for free cooling";
            4111: BIT, R_, "FREE_COOLING_ACTIVE"
                => "Free cooling is currently running";
            7001: U16, RW, "FILTER_PERIOD", min = 3, max = 15
                => "Filter replacement period, months";
            7002: U16, RW, "FILTER_REPLACEMENT_TIME_L", high = 7003
                => "Time of the latest filter replacement";
            7003: U16, RW, "FILTER_REPLACEMENT_TIME_H"
                => "Time of the latest filter replacement, higher 16 bits";
            7005: U16, R_, "FILTER_REMAINING_TIME_L", high = 7006
                => "Remaining filter time, seconds";
            7006: U16, R_, "FILTER_REMAINING_TIME_H"
                => "Remaining filter time, higher 16 bits";
            12101: CEL, R_, "SENSOR_FPT", min = -400, max = 800
                => "Frost protection temperature";
            12102: CEL, R_, "SENSOR_OAT", min = -400, max = 800
                => "Outdoor air temperature";
            12103: CEL, R_, "SENSOR_SAT", min = -400, max = 800
                => "Supply air temperature";
            12104: CEL, R_, "SENSOR_RAT", min = -400, max = 800
                => "Room air temperature";
            12105: CEL, R_, "SENSOR_EAT", min = -400, max = 800
                => "Extract air temperature";
            12106: CEL, R_, "SENSOR_ECT", min = -400, max = 800
                => "Extra controller temperature";
            12107: CEL, R_, "SENSOR_EFT", min = -400, max = 800
                => "Exhaust air temperature";
            12108: CEL, R_, "SENSOR_OHT", min = -400, max = 800
                => "Overheat temperature";
            12109: U16, R_, "SENSOR_RHS", min = 0, max = 100
                => "Relative humidity, percent";
            12115: U16, R_, "SENSOR_CO2S", min = 0, max = 2000
                => "CO2 concentration, ppm";
            12136: U16, R_, "SENSOR_RHS_PDM", min = 0, max = 100
                => "Extract air relative humidity from the PDM sensor, percent";
            12401: U16, R_, "SENSOR_RPM_SAF", min = 0, max = 5000
                => "Supply fan speed, RPM";
            12402: U16, R_, "SENSOR_RPM_EAF", min = 0, max = 5000
                => "Extract fan speed, RPM";
            12403: U16, R_, "SENSOR_FLOW_PIGGYBACK_SAF"
                => "Supply air flow";
            12404: U16, R_, "SENSOR_FLOW_PIGGYBACK_EAF"
                => "Extract air flow";
            12544: CEL, R_, "SENSOR_PDM_EAT_VALUE", min = -400, max = 800
                => "Extract air temperature from the PDM sensor";
            14001: U16, R_, "OUTPUT_SAF", min = 0, max = 100
                => "Supply fan output, percent";
            14002: U16, R_, "OUTPUT_EAF", min = 0, max = 100
                => "Extract fan output, percent";
            14003: BIT, R_, "OUTPUT_ALARM"
                => "Sum alarm output is active";
            14381: BIT, R_, "OUTPUT_TRIAC"
                => "Heater triac output is active";
            15016: U16, R_, "ALARM_FROST_PROT_ALARM", min = 0, max = 3
                => "Frost protection alarm. 0=Inactive, 1=Active, 2=Waiting, 3=Cleared";
            15030: U16, R_, "ALARM_SAF_RPM_ALARM", min = 0, max = 3
                => "Supply fan RPM alarm";
            15037: U16, R_, "ALARM_EAF_RPM_ALARM", min = 0, max = 3
                => "Extract fan RPM alarm";
            15065: U16, R_, "ALARM_OAT_ALARM", min = 0, max = 3
                => "Outdoor air temperature sensor alarm";
            15072: U16, R_, "ALARM_SAT_ALARM", min = 0, max = 3
                => "Supply air temperature sensor alarm";
            15086: U16, R_, "ALARM_EAT_ALARM", min = 0, max = 3
                => "Extract air temperature sensor alarm";
            15107: U16, R_, "ALARM_OHT_ALARM", min = 0, max = 3
                => "Overheat temperature alarm";
            15142: U16, R_, "ALARM_FILTER_ALARM", min = 0, max = 3
                => "Filter alarm";
            15156: U16, R_, "ALARM_EXTERNAL_STOP_ALARM", min = 0, max = 3
                => "External stop alarm";
            15163: U16, R_, "ALARM_RH_ALARM", min = 0, max = 3
                => "Relative humidity sensor alarm";
            15177: U16, R_, "ALARM_LOW_SAT_ALARM", min = 0, max = 3
                => "Low supply air temperature alarm";
            15901: BIT, R_, "ALARM_TYPE_A"
                => "An alarm of type A is active";
            15902: BIT, R_, "ALARM_TYPE_B"
                => "An alarm of type B is active";
            15903: BIT, R_, "ALARM_TYPE_C"
                => "An alarm of type C is active";
        }
    };
}

macro_rules! optional {
    () => {
        None
    };
    ($($lit: tt)+) => {
        Some($($lit)*)
    };
}

macro_rules! make_lists {
    ($(
        $regnum: literal: $dt: ident, $mode: ident, $name: literal
        $(, high = $high: literal)?
        $(, min = $min: literal)?
        $(, max = $max: literal)?
        => $description: literal;
    )+) => {
        pub const ADDRESSES: &[u16] = &[$($regnum),*];
        pub const NAMES: &[&str] = &[$($name),*];
        pub const DESCRIPTIONS: &[&str] = &[$($description),*];
        pub const MODES: &[Mode] = &[$(Mode::$mode),*];
        pub const DATA_TYPES: &[DataType] = &[$(DataType::$dt),*];
        pub const HIGH_WORDS: &[Option<u16>] = &[$(optional!($($high)?)),*];
        pub const MINIMUM_VALUES: &[Option<i32>] = &[$(optional!($($min)?)),*];
        pub const MAXIMUM_VALUES: &[Option<i32>] = &[$(optional!($($max)?)),*];
    };
}

for_each_register!(make_lists);

const _ASSERT_CATALOG_WELL_FORMED: () = const {
    let mut index = 0;
    let mut previous_address = 0;
    while index < ADDRESSES.len() {
        let address = ADDRESSES[index];
        if address <= previous_address {
            panic!("ADDRESSES is not sorted (or has duplicate values)!");
        }
        previous_address = address;
        if let Some(high) = HIGH_WORDS[index] {
            if RegisterIndex::from_address(high).is_none() {
                panic!("a 32-bit register refers to a high word missing from the catalog");
            }
        }
        if let (Some(min), Some(max)) = (MINIMUM_VALUES[index], MAXIMUM_VALUES[index]) {
            if min > max {
                panic!("register minimum exceeds its maximum");
            }
        }
        index += 1;
    }
};

pub const FUNCTION_ACTIVE_HEATER: RegisterIndex =
    RegisterIndex::from_name("FUNCTION_ACTIVE_HEATER").unwrap();
pub const FUNCTION_ACTIVE_COOLER: RegisterIndex =
    RegisterIndex::from_name("FUNCTION_ACTIVE_COOLER").unwrap();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_and_address_agree() {
        for register in all_registers() {
            assert_eq!(lookup(register.name()), Ok(register));
            assert_eq!(RegisterIndex::from_address(register.address()), Some(register));
        }
    }

    #[test]
    fn unknown_lookups() {
        assert_eq!(lookup("REG_NOPE"), Err(UnknownRegister("REG_NOPE".into())));
        assert_eq!(RegisterIndex::from_address(0), None);
        assert_eq!(RegisterIndex::from_address(1000), None);
        assert_eq!(RegisterIndex::from_address(u16::MAX), None);
    }

    #[test]
    fn low_words_point_at_their_high_words() {
        let low = lookup("FILTER_REMAINING_TIME_L").unwrap();
        let high = low.high_word().unwrap();
        assert_eq!(high.name(), "FILTER_REMAINING_TIME_H");
        assert_eq!(high.address(), 7006);
        assert_eq!(high.high_word(), None);
    }

    #[test]
    fn snapshot_keys_are_zero_based() {
        let oat = lookup("SENSOR_OAT").unwrap();
        assert_eq!(oat.address(), 12102);
        assert_eq!(oat.snapshot_key(), 12101);
    }

    #[test]
    fn metadata() {
        let sp = lookup("TC_SP").unwrap();
        assert_eq!(sp.data_type(), DataType::CEL);
        assert_eq!(sp.data_type().to_string(), "S/10");
        assert_eq!((sp.minimum(), sp.maximum()), (Some(120), Some(300)));
        assert!(sp.mode().is_writable());
        assert_eq!(sp.mode().to_string(), "RW");

        assert!(FUNCTION_ACTIVE_HEATER.data_type().is_boolean());
        assert!(!FUNCTION_ACTIVE_COOLER.mode().is_writable());
        assert_eq!(FUNCTION_ACTIVE_COOLER.data_type().to_string(), "BOOL");
    }

    #[test]
    fn zero_scale_divides_by_one() {
        let dt = DataType { scale: 0, signed: false, boolean: false };
        assert_eq!(dt.scale_factor(), 1);
        assert_eq!(DataType::SPH.scale_factor(), 10);
    }
}
