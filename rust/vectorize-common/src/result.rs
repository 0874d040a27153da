pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn checked_half(n: usize) -> super::Result<usize> {
        verify_arg!(n, n % 2 == 0);
        Ok(n / 2)
    }

    #[test]
    fn test_verify_arg() {
        assert_eq!(checked_half(8).unwrap(), 4);
        let e = checked_half(7).unwrap_err();
        match e.kind() {
            ErrorKind::InvalidArgument { name, message } => {
                assert_eq!(name, "n");
                assert_eq!(message, "n % 2 == 0");
            }
            kind => panic!("unexpected kind {kind:?}"),
        }
    }
}
