use std::fmt::{self, Debug, Display};

/// Holder for the credentials the gateway carries at runtime: the marketplace API token and the
/// messaging-gateway token. Both `Debug` and `Display` print a mask, so configs that embed a `Secret` can
/// be logged freely. The only way to the value is [`Secret::reveal`]; its call sites are the complete list
/// of places a credential leaves the wrapper.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T: Clone + Default> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
