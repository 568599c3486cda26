use crate::color::chromaticity::Chromaticity;
use crate::drivers::driver::CommandId;
use crate::error::{DynResult, MixError};
use crate::fixture::frame::{FrameEncoder, WiringTable, REFERENCE_MAX_CODE, RGBAW_WIRING};
use crate::fixture::lamp::{Fixture, SET_PWM_COMMAND};
use crate::fixture::palette::{Palette, REFERENCE_PRIMARIES};
use crate::fixture::primary::{Primary, ResponseCurve};
use crate::mixing::allocator::MixingAllocator;
use log::debug;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimaryConfig {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub capacity: f64,
    #[serde(default)]
    pub curve: ResponseCurve,
}

fn default_command() -> CommandId {
    SET_PWM_COMMAND
}

fn default_max_code() -> u8 {
    REFERENCE_MAX_CODE
}

/// Description of a fixture as stored in a JSON file.
///
/// ```json
/// {
///   "max_code": 255,
///   "primaries": [
///     {"name": "white", "x": 0.434, "y": 0.403, "capacity": 675.0},
///     {"name": "red", "x": 0.68, "y": 0.3, "capacity": 400.0, "curve": {"gamma": 2.2}}
///   ],
///   "wiring": ["red", "white"]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixtureConfig {
    #[serde(default = "default_command")]
    pub command: CommandId,
    #[serde(default = "default_max_code")]
    pub max_code: u8,
    /// In order of decreasing priority
    pub primaries: Vec<PrimaryConfig>,
    /// Primary names in frame order
    pub wiring: Vec<String>,
}

impl FixtureConfig {
    pub fn reference() -> FixtureConfig {
        let primaries = REFERENCE_PRIMARIES
            .iter()
            .map(|&(name, x, y, capacity)| PrimaryConfig {
                name: name.to_string(),
                x,
                y,
                capacity,
                curve: ResponseCurve::Linear,
            })
            .collect();
        let mut wiring = RGBAW_WIRING.to_vec();
        wiring.sort_by_key(|&(_, slot)| slot);
        FixtureConfig {
            command: SET_PWM_COMMAND,
            max_code: REFERENCE_MAX_CODE,
            primaries,
            wiring: wiring.iter().map(|(n, _)| n.to_string()).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<FixtureConfig, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> DynResult<FixtureConfig> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let conf = FixtureConfig::from_json(&json)?;
        debug!(
            "Loaded fixture with {} primaries from {}",
            conf.primaries.len(),
            path.display()
        );
        Ok(conf)
    }

    pub fn palette(&self) -> Result<Palette, MixError> {
        let primaries = self
            .primaries
            .iter()
            .map(|p| {
                let chromaticity = Chromaticity::try_new(p.x, p.y)
                    .map_err(|e| MixError::InvalidPalette(format!("{}: {}", p.name, e)))?;
                Primary::new(&p.name, chromaticity, p.capacity)?.with_curve(p.curve)
            })
            .collect::<Result<Vec<Primary>, MixError>>()?;
        Palette::new(primaries)
    }

    pub fn build(&self) -> Result<Fixture, MixError> {
        let palette = Arc::new(self.palette()?);
        let wiring = WiringTable::from_order(&self.wiring)?;
        let encoder = FrameEncoder::new(palette.clone(), wiring, self.max_code)?;
        Ok(Fixture::new(
            MixingAllocator::new(palette),
            encoder,
            self.command,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::FixtureConfig;
    use crate::color::chromaticity::Color;
    use crate::error::MixError;
    use crate::fixture::frame::{Frame, WiringTable};
    use crate::fixture::palette::Palette;
    use crate::fixture::primary::ResponseCurve;

    const TWO_CHANNEL: &str = r#"
{
  "max_code": 100,
  "primaries": [
    {"name": "warm", "x": 0.46, "y": 0.41, "capacity": 300.0},
    {"name": "cold", "x": 0.31, "y": 0.32, "capacity": 300.0, "curve": {"gamma": 2.0}}
  ],
  "wiring": ["cold", "warm"]
}
"#;

    #[test]
    fn reference_matches_palette() {
        let conf = FixtureConfig::reference();
        assert_eq!(conf.palette(), Palette::reference());
        assert_eq!(conf.command, 1);
        let fixture = conf.build().unwrap();
        assert_eq!(fixture.encoder().wiring(), &WiringTable::rgbaw());
        assert_eq!(fixture.encoder().max_code(), 255);
    }

    #[test]
    fn parse_json() {
        let conf = FixtureConfig::from_json(TWO_CHANNEL).unwrap();
        assert_eq!(conf.command, 1);
        assert_eq!(conf.max_code, 100);
        assert_eq!(conf.primaries[0].curve, ResponseCurve::Linear);
        assert_eq!(conf.primaries[1].curve, ResponseCurve::Gamma(2.0));
        let fixture = conf.build().unwrap();
        // Quarter output with gamma 2 is half duty
        let (_, frame) = fixture.mix(&Color::new(0.31, 0.32, 75.0)).unwrap();
        assert_eq!(frame, Frame(vec![50, 0]));
        let (_, frame) = fixture.mix(&Color::new(0.46, 0.41, 300.0)).unwrap();
        assert_eq!(frame, Frame(vec![0, 100]));
    }

    #[test]
    fn reference_json() {
        let json = FixtureConfig::reference().to_json().unwrap();
        let conf = FixtureConfig::from_json(&json).unwrap();
        assert_eq!(conf.wiring, ["red", "green", "blue", "amber", "white"]);
        assert_eq!(conf.primaries.len(), 5);
        assert!(json.contains("\"linear\""));
    }

    #[test]
    fn invalid_configs() {
        assert!(FixtureConfig::from_json("{\"primaries\": []}").is_err());
        let mut conf = FixtureConfig::reference();
        conf.wiring.pop();
        assert!(matches!(conf.build(), Err(MixError::InvalidWiring(_))));
        let mut conf = FixtureConfig::reference();
        conf.primaries[0].y = 0.0;
        assert!(conf.build().is_err());
        let mut conf = FixtureConfig::reference();
        conf.primaries[1].x = 1.5;
        assert!(matches!(conf.build(), Err(MixError::InvalidPalette(_))));
        let mut conf = FixtureConfig::reference();
        conf.max_code = 0;
        assert!(conf.build().is_err());
    }

    #[test]
    fn missing_file() {
        assert!(FixtureConfig::load("/nonexistent/fixture.json").is_err());
    }
}
