/// Error code registry for the analytics layer
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Row source errors
/// - 3000-3999: Tenant isolation errors
/// - 7000-7999: Validation errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_UNKNOWN_SECTOR: u16 = 1006;
    pub const CONFIG_VALIDATION_FAILED: u16 = 1008;

    // Row source errors (2000-2999)
    pub const SOURCE_GENERIC: u16 = 2000;
    pub const SOURCE_UNAVAILABLE: u16 = 2001;
    pub const SOURCE_QUERY_FAILED: u16 = 2002;
    pub const SOURCE_DECODE_FAILED: u16 = 2003;
    pub const SOURCE_IO_ERROR: u16 = 2004;
    pub const SOURCE_CONTRACT_VIOLATION: u16 = 2005;

    // Tenant isolation errors (3000-3999)
    pub const TENANT_MISMATCH: u16 = 3001;

    // Validation errors (7000-7999)
    pub const VALIDATION_OUT_OF_RANGE: u16 = 7003;
    pub const VALIDATION_INVALID_INPUT: u16 = 7008;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        // Configuration errors
        1000 => "Generic configuration error",
        1001 => "Configuration file not found",
        1002 => "Invalid TOML syntax in configuration",
        1005 => "Invalid value in configuration",
        1006 => "Sector has no benchmark configuration",
        1008 => "Configuration validation failed",

        // Row source errors
        2000 => "Generic row source error",
        2001 => "Row source is unavailable",
        2002 => "Row source query failed",
        2003 => "Rows returned by the source could not be decoded",
        2004 => "Row source I/O error",
        2005 => "Row source returned rows outside the requested entity type",

        // Tenant isolation errors
        3001 => "Row belongs to a different tenant than the one requested",

        // Validation errors
        7003 => "Value is out of the allowed range",
        7008 => "Invalid input",

        _ => "Unknown error code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_registered_code_has_description() {
        let codes = [
            ErrorCode::CONFIG_GENERIC,
            ErrorCode::CONFIG_NOT_FOUND,
            ErrorCode::CONFIG_INVALID_TOML,
            ErrorCode::CONFIG_INVALID_VALUE,
            ErrorCode::CONFIG_UNKNOWN_SECTOR,
            ErrorCode::CONFIG_VALIDATION_FAILED,
            ErrorCode::SOURCE_GENERIC,
            ErrorCode::SOURCE_UNAVAILABLE,
            ErrorCode::SOURCE_QUERY_FAILED,
            ErrorCode::SOURCE_DECODE_FAILED,
            ErrorCode::SOURCE_IO_ERROR,
            ErrorCode::SOURCE_CONTRACT_VIOLATION,
            ErrorCode::TENANT_MISMATCH,
            ErrorCode::VALIDATION_OUT_OF_RANGE,
            ErrorCode::VALIDATION_INVALID_INPUT,
        ];

        for code in codes {
            assert_ne!(describe_error_code(code), "Unknown error code", "code {code}");
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(describe_error_code(4242), "Unknown error code");
    }
}
