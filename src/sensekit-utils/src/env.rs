//! Build-time overrides read from environment variables.

pub use {const_panic, konst};

macro_rules! define_env_with_default_macro {
    ($macro_name:ident, $parse_fn_name:ident, $output_type_name:literal) => {
        #[macro_export]
        macro_rules! $macro_name {
            ($env_var:literal, $default:expr) => {
                if let Some(str_value) = option_env!($env_var) {
                    if let Ok(value) = $crate::env::konst::primitive::$parse_fn_name(str_value) {
                        value
                    } else {
                        $crate::env::const_panic::concat_panic!(
                            "Could not parse environment variable `",
                            $env_var,
                            "=",
                            str_value,
                            "` as ",
                            $output_type_name,
                        );
                    }
                } else {
                    $default
                }
            };
        }
    };
}

define_env_with_default_macro!(u8_from_env_or, parse_u8, "a u8");
define_env_with_default_macro!(u16_from_env_or, parse_u16, "a u16");
define_env_with_default_macro!(i16_from_env_or, parse_i16, "an i16");

#[cfg(test)]
mod tests {
    #[test]
    fn unset_variables_fall_back_to_the_default() {
        const ADDRESS: u8 = u8_from_env_or!("SENSEKIT_TEST_UNSET_ADDRESS", 0x48);
        const MILLIVOLTS: u16 = u16_from_env_or!("SENSEKIT_TEST_UNSET_MILLIVOLTS", 5000);
        const CELSIUS: i16 = i16_from_env_or!("SENSEKIT_TEST_UNSET_CELSIUS", -40);

        assert_eq!(ADDRESS, 0x48);
        assert_eq!(MILLIVOLTS, 5000);
        assert_eq!(CELSIUS, -40);
    }
}
