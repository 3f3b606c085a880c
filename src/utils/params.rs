//! Parameter file loading

use std::fs::read_to_string;
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;

use crate::common::RoboticsResult;

/// Load a parameter struct from a TOML file
pub fn load<P, A>(param_file_path: A) -> RoboticsResult<P>
where
    P: DeserializeOwned,
    A: AsRef<Path>,
{
    let params_str = read_to_string(param_file_path.as_ref())?;
    let params = toml::from_str(params_str.as_str())?;
    debug!("loaded parameters from {:?}", param_file_path.as_ref());
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RoboticsError;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Params {
        name: String,
        rate: f64,
    }

    #[test]
    fn test_load_and_errors() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("rust_motion_planning_params_{}.toml", std::process::id()));
        std::fs::write(&good, "name = \"probe\"\nrate = 0.5\n").unwrap();
        let params: Params = load(&good).unwrap();
        assert_eq!(params.name, "probe");
        assert_eq!(params.rate, 0.5);

        std::fs::write(&good, "name = 3\n").unwrap();
        let err = load::<Params, _>(&good).unwrap_err();
        let _ = std::fs::remove_file(&good);
        assert!(matches!(err, RoboticsError::ConfigParseError(_)));

        let missing = load::<Params, _>(dir.join("definitely_missing_params.toml")).unwrap_err();
        assert!(matches!(missing, RoboticsError::IoError(_)));
    }
}
