use std::fmt;

/// The four provider endpoints, keyed in the `[AllUrl]` config section by
/// [`Endpoint::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    RealTime,
    SevenDay,
    FifteenDay,
    Hourly,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::RealTime => "realtime",
            Endpoint::SevenDay => "seven_day",
            Endpoint::FifteenDay => "fifteen_day",
            Endpoint::Hourly => "hourly",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[Endpoint::RealTime, Endpoint::SevenDay, Endpoint::FifteenDay, Endpoint::Hourly]
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
