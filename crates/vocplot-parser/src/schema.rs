/// Columns the observation frame can carry, in canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputColumn {
    SiteId,
    SiteName,
    ParameterCode,
    CompoundName,
    Date,
    Time,
    Value,
    WindSpeed,
    WindDirection,
}

pub const SITE_ID: &str = "site_id";
pub const SITE_NAME: &str = "site_name";
pub const PARAMETER_CODE: &str = "parameter_code";
pub const COMPOUND_NAME: &str = "compound_name";
pub const RAW_DATE: &str = "raw_date";
pub const RAW_TIME: &str = "raw_time";
pub const VALUE: &str = "value";
pub const WIND_SPEED: &str = "wind_speed";
pub const WIND_DIRECTION: &str = "wind_direction";

pub const REQUIRED_COLUMNS: [InputColumn; 7] = [
    InputColumn::SiteId,
    InputColumn::SiteName,
    InputColumn::ParameterCode,
    InputColumn::CompoundName,
    InputColumn::Date,
    InputColumn::Time,
    InputColumn::Value,
];

pub const OPTIONAL_COLUMNS: [InputColumn; 2] = [InputColumn::WindSpeed, InputColumn::WindDirection];

impl InputColumn {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            InputColumn::SiteId => SITE_ID,
            InputColumn::SiteName => SITE_NAME,
            InputColumn::ParameterCode => PARAMETER_CODE,
            InputColumn::CompoundName => COMPOUND_NAME,
            InputColumn::Date => RAW_DATE,
            InputColumn::Time => RAW_TIME,
            InputColumn::Value => VALUE,
            InputColumn::WindSpeed => WIND_SPEED,
            InputColumn::WindDirection => WIND_DIRECTION,
        }
    }

    /// Header spelling used by the monitoring network exports.
    pub fn header_name(&self) -> &'static str {
        match self {
            InputColumn::SiteId => "Site ID",
            InputColumn::SiteName => "Site name",
            InputColumn::ParameterCode => "Parameter Cd",
            InputColumn::CompoundName => "Compound_Name",
            InputColumn::Date => "Date",
            InputColumn::Time => "Time",
            InputColumn::Value => "Value",
            InputColumn::WindSpeed => "Wind Speed",
            InputColumn::WindDirection => "Wind Direction",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            InputColumn::SiteId => &["site id", "site_id"],
            InputColumn::SiteName => &["site name", "site_name"],
            InputColumn::ParameterCode => &["parameter cd", "parameter_code", "parameter_cd"],
            InputColumn::CompoundName => &["compound_name", "compound name"],
            InputColumn::Date => &["date"],
            InputColumn::Time => &["time"],
            InputColumn::Value => &["value"],
            InputColumn::WindSpeed => &["wind speed", "wind_speed"],
            InputColumn::WindDirection => &["wind direction", "wind_direction"],
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            InputColumn::Value | InputColumn::WindSpeed | InputColumn::WindDirection
        )
    }

    /// Auxiliary readings that are kept when numeric and nulled otherwise.
    pub fn is_lenient(&self) -> bool {
        matches!(self, InputColumn::WindSpeed | InputColumn::WindDirection)
    }

    /// Resolves a header cell to a known column; unknown headers map to `None`.
    pub fn classify_header(header: &str) -> Option<InputColumn> {
        let lower = header.trim().to_ascii_lowercase();
        REQUIRED_COLUMNS
            .iter()
            .chain(OPTIONAL_COLUMNS.iter())
            .find(|column| column.aliases().contains(&lower.as_str()))
            .copied()
    }
}

pub const OBSERVATION_COLUMNS: [&str; 7] = [
    SITE_ID,
    SITE_NAME,
    PARAMETER_CODE,
    COMPOUND_NAME,
    RAW_DATE,
    RAW_TIME,
    VALUE,
];
