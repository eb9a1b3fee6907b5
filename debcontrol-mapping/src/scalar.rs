/// A value with a built-in text form: `String` or a primitive integer.
///
/// Strings are taken verbatim. Integers parse as base-10, with the empty
/// string mapping to zero, and format as plain decimal.
pub trait Scalar: Sized + Send + Sync + 'static {
    fn parse_scalar(raw: &str) -> Result<Self, String>;

    fn format_scalar(&self) -> String;
}

impl Scalar for String {
    fn parse_scalar(raw: &str) -> Result<Self, String> {
        Ok(raw.to_owned())
    }

    fn format_scalar(&self) -> String {
        self.clone()
    }
}

macro_rules! integer_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                fn parse_scalar(raw: &str) -> Result<Self, String> {
                    if raw.is_empty() {
                        return Ok(0);
                    }
                    raw.parse::<$ty>().map_err(|e| e.to_string())
                }

                fn format_scalar(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
