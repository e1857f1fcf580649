//! # Core Domain Entities
//!
//! Primitives shared by every crate in the workspace.
//!
//! ## Clusters
//!
//! - **Identity**: [`Address`]
//! - **Flights**: [`FlightKey`], [`FlightStatus`]
//! - **Airlines**: [`AirlineState`]

use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// IDENTITY
// =============================================================================

/// A 20-byte account identity (airline, passenger, oracle or owner).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Build a test-friendly address whose last byte is `n`.
    pub const fn from_low_u8(n: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let invalid = || TypeError::InvalidAddress {
            input: s.to_string(),
        };

        let decoded = hex::decode(digits).map_err(|_| invalid())?;
        let bytes: [u8; 20] = decoded.try_into().map_err(|_| invalid())?;
        Ok(Address(bytes))
    }
}

// =============================================================================
// FLIGHTS
// =============================================================================

/// Unique flight identity: operating airline, flight code and departure time.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightKey {
    /// Operating airline.
    pub airline: Address,
    /// Flight code, e.g. `"ND1309"`.
    pub flight: String,
    /// Scheduled departure (unix seconds).
    pub timestamp: u64,
}

impl FlightKey {
    pub fn new(airline: Address, flight: impl Into<String>, timestamp: u64) -> Self {
        Self {
            airline,
            flight: flight.into(),
            timestamp,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.flight, self.timestamp, self.airline)
    }
}

impl fmt::Debug for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlightKey({})", self)
    }
}

/// Flight status as reported by oracles.
///
/// Numeric codes follow the external oracle protocol:
/// Unknown (0), OnTime (10), LateAirline (20), LateWeather (30),
/// LateTechnical (40), LateOther (50).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlightStatus {
    #[default]
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    /// Every status in code order.
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    /// Wire code.
    pub const fn code(self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    /// Variant name, used as a log and metric label.
    pub const fn name(self) -> &'static str {
        match self {
            FlightStatus::Unknown => "Unknown",
            FlightStatus::OnTime => "OnTime",
            FlightStatus::LateAirline => "LateAirline",
            FlightStatus::LateWeather => "LateWeather",
            FlightStatus::LateTechnical => "LateTechnical",
            FlightStatus::LateOther => "LateOther",
        }
    }

    /// Only delays caused by the airline trigger an insurance payout.
    pub const fn is_airline_fault(self) -> bool {
        matches!(self, FlightStatus::LateAirline)
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, FlightStatus::Unknown)
    }
}

impl TryFrom<u8> for FlightStatus {
    type Error = TypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        FlightStatus::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(TypeError::UnknownStatusCode(code))
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

// =============================================================================
// AIRLINES
// =============================================================================

/// Airline lifecycle stage.
///
/// State progression: Applied → Registered → Funded. Never regresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AirlineState {
    /// Waiting for consensus approval.
    Applied,
    /// Admitted; may register other airlines but not operate flights.
    Registered,
    /// Paid its dues; full participant.
    Funded,
}

impl AirlineState {
    /// Wire code (Applied = 0, Registered = 1, Funded = 2).
    pub const fn code(self) -> u8 {
        match self {
            AirlineState::Applied => 0,
            AirlineState::Registered => 1,
            AirlineState::Funded => 2,
        }
    }

    /// Registered or Funded airlines count toward the consensus denominator.
    pub const fn is_participant(self) -> bool {
        matches!(self, AirlineState::Registered | AirlineState::Funded)
    }
}

impl TryFrom<u8> for AirlineState {
    type Error = TypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(AirlineState::Applied),
            1 => Ok(AirlineState::Registered),
            2 => Ok(AirlineState::Funded),
            other => Err(TypeError::UnknownAirlineState(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display_round_trip() {
        let addr = Address::from_low_u8(0xAB);
        let text = addr.to_string();
        assert_eq!(text, "0x00000000000000000000000000000000000000ab");
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_address_parse_rejects_short_input() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(matches!(err, TypeError::InvalidAddress { .. }));
    }

    #[test]
    fn test_address_parse_accepts_checksummed_case() {
        let addr: Address = "0xf17f52151EbEF6C7334FAD080c5704D77216b732".parse().unwrap();
        assert_eq!(addr.0[0], 0xf1);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FlightStatus::try_from(20).unwrap(), FlightStatus::LateAirline);
        assert_eq!(FlightStatus::try_from(0).unwrap(), FlightStatus::Unknown);
        assert_eq!(
            FlightStatus::try_from(25).unwrap_err(),
            TypeError::UnknownStatusCode(25)
        );
    }

    #[test]
    fn test_status_names_match_variants() {
        for status in FlightStatus::ALL {
            assert_eq!(status.name(), format!("{:?}", status));
        }
        assert_eq!(FlightStatus::LateAirline.to_string(), "LateAirline(20)");
    }

    #[test]
    fn test_only_late_airline_is_fault() {
        let faults: Vec<_> = FlightStatus::ALL
            .into_iter()
            .filter(|s| s.is_airline_fault())
            .collect();
        assert_eq!(faults, vec![FlightStatus::LateAirline]);
    }

    #[test]
    fn test_airline_state_ordering() {
        assert!(AirlineState::Applied < AirlineState::Registered);
        assert!(AirlineState::Registered < AirlineState::Funded);
        assert!(!AirlineState::Applied.is_participant());
        assert_eq!(AirlineState::try_from(2).unwrap(), AirlineState::Funded);
    }

    #[test]
    fn test_flight_key_serde() {
        let key = FlightKey::new(Address::from_low_u8(1), "ND1309", 1_700_000_000);
        let json = serde_json::to_string(&key).unwrap();
        let back: FlightKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
