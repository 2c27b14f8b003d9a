//! The printer address field: read-only until the operator asks to edit
//! it, and locked again once a new address has been stored.

/// State of the printer address field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressField {
    value: String,
    editable: bool,
}

impl AddressField {
    /// Address currently shown.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Can the operator type into the field?
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Show an address fetched from the backend. Ignored while the operator
    /// is editing, so a late answer does not clobber their input.
    pub(crate) fn load(&mut self, value: &str) -> bool {
        if self.editable {
            return false;
        }
        self.value = value.to_owned();
        true
    }

    /// Unlock the field for editing.
    pub(crate) fn edit(&mut self) {
        self.editable = true;
    }

    /// Show a newly stored address, and lock the field again.
    pub(crate) fn commit(&mut self, value: &str) {
        self.value = value.to_owned();
        self.editable = false;
    }
}

/// Trim an operator-entered address, rejecting one that is empty or
/// contains whitespace.
pub(crate) fn normalize(address: &str) -> Option<&str> {
    let address = address.trim();
    if address.is_empty() || address.contains(char::is_whitespace) {
        return None;
    }
    Some(address)
}
