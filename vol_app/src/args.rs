//! Argument parsing and validation
//! Uses library `clap`

use clap::{Arg, Command, ValueHint};

use crate::defaults;

pub fn is_positive_number(num: &str) -> Result<(), String> {
    match num.parse::<u32>() {
        Ok(n) if n > 0 => Ok(()),
        Ok(_) => Err("Number must be greater than 0".into()),
        Err(_) => Err("Number required".into()),
    }
}

const BOUNDARY_NAMES: &[&str] = &["first-face", "all-axes"];
const PRESET_NAMES: &[&str] = &["continuous", "discrete"];

pub fn get_command<'a>() -> Command<'a> {
    Command::new("Vol-app")
        .version("0.1.0")
        .about("Volume analysis and transfer function viewer, reads commands from stdin")
        .arg(
            Arg::new("header")
                .help("Dataset header file")
                .required(true)
                .value_name("FILE")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("boundary")
                .help("Derivative boundary handling")
                .long("boundary")
                .short('b')
                .default_value(defaults::BOUNDARY)
                .value_name("POLICY")
                .possible_values(BOUNDARY_NAMES),
        )
        .arg(
            Arg::new("preset")
                .help("Transfer function preset")
                .long("preset")
                .short('p')
                .default_value(defaults::PRESET)
                .value_name("NAME")
                .possible_values(PRESET_NAMES),
        )
        .arg(
            Arg::new("no-third-order")
                .help("Skip the third derivative and its opacity threshold")
                .long("no-third-order"),
        )
        .arg(
            Arg::new("smooth")
                .help("Box filter the volume before differentiation")
                .long("smooth"),
        )
        .arg(
            Arg::new("shading")
                .help("Diffuse shading in the composite view")
                .long("shading"),
        )
        .arg(
            Arg::new("resolution")
                .help("Size of rendered frames")
                .long("resolution")
                .short('r')
                .number_of_values(2)
                .value_names(&["W", "H"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("output-dir")
                .help("Directory for rendered frames")
                .long("output-dir")
                .short('o')
                .default_value(defaults::OUTPUT_DIR)
                .value_name("DIR")
                .value_hint(ValueHint::DirPath),
        )
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn command_is_valid() {
        get_command().debug_assert();
    }

    #[test]
    fn header_required() {
        let res = get_command().try_get_matches_from(vec!["vol_app"]);
        assert!(res.is_err());
    }

    #[test]
    fn unknown_preset() {
        let res =
            get_command().try_get_matches_from(vec!["vol_app", "a.dat", "--preset", "spectral"]);
        assert!(res.is_err());
    }

    #[test]
    fn resolution_values() {
        let m = get_command()
            .try_get_matches_from(vec!["vol_app", "a.dat", "--resolution=320,200"])
            .unwrap();
        let vals: Vec<&str> = m.values_of("resolution").unwrap().collect();
        assert_eq!(vals, vec!["320", "200"]);

        let zero =
            get_command().try_get_matches_from(vec!["vol_app", "a.dat", "--resolution=0,200"]);
        assert!(zero.is_err());
    }
}
