//! Argument parsing and validation
//! Uses library `clap`

use std::ffi::OsStr;

use clap::{Arg, Command, ValueHint};

// up to 32bit value
pub fn is_positive_number(num: &str) -> Result<(), String> {
    let n = num.parse::<u32>();
    match n {
        Ok(n) => {
            if n > 0 {
                Ok(())
            } else {
                Err("Number must be greater than 0".into())
            }
        }
        Err(_) => Err("Number required".into()),
    }
}

pub fn can_fit_u16(num: &str) -> Result<(), String> {
    let n = num.parse::<u16>();
    match n {
        Ok(_) => Ok(()),
        Err(_) => Err("Number does not fit in range <0;65535>".into()),
    }
}

const GENERATOR_NAMES: &[&str] = &["shapes", "solid", "two-face", "ramp"];
const FORMAT_NAMES: &[&str] = &["UCHAR", "USHORT"];

pub fn get_command<'a>() -> Command<'a> {
    Command::new("Vol-gen")
        .version("0.1.0")
        .about("Synthetic volume generator, writes a header + raw file pair")
        .arg(
            Arg::new("dims")
                .help("Dimensions of volume")
                .long("dims")
                .short('d')
                .required(true)
                .number_of_values(3)
                .value_names(&["X", "Y", "Z"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("generator")
                .help("Type of generator")
                .long("generator")
                .short('g')
                .required(true)
                .requires_ifs(&[
                    ("solid", "sample"), // if solid is set, require option sample
                    ("shapes", "n-of-shapes"),
                    ("shapes", "sample"),
                    ("shapes", "object-size"),
                    ("two-face", "sample"),
                    ("ramp", "sample"),
                ])
                .takes_value(true)
                .value_name("NAME")
                .possible_values(GENERATOR_NAMES),
        )
        .arg(
            Arg::new("format")
                .help("Sample format")
                .long("format")
                .short('f')
                .default_value("UCHAR")
                .value_name("FORMAT")
                .possible_values(FORMAT_NAMES),
        )
        .arg(
            Arg::new("seed")
                .help("Seed for RNG, leave out for random seed")
                .long("seed")
                .value_name("SEED")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("sample")
                .help("Value of generated objects, maximum value for ramp")
                .long("sample")
                .value_name("VALUE")
                .validator(can_fit_u16),
        )
        .arg(
            Arg::new("object-size")
                .help("Size of individual generated objects")
                .long("object-size")
                .value_name("SIDE")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("n-of-shapes")
                .help("Number of shapes generated in volume")
                .long("n-of-shapes")
                .value_name("N")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("pad")
                .help("Empty border around solid volume")
                .long("pad")
                .value_name("VOXELS")
                .default_value("0")
                .validator(can_fit_u16),
        )
        .arg(
            Arg::new("output-file")
                .help("Header file to write, raw file is written next to it")
                .long("output-file")
                .short('o')
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath)
                .default_value_os(OsStr::new("volume.dat")),
        )
}
