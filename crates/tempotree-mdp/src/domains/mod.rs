//! Reference domains authored through [`DomainBuilder`](crate::DomainBuilder).

mod full_conc;
mod nasa_rover;
mod stuck_car;

use crate::{Domain, DomainKind, MdpError};

pub use full_conc::full_conc;
pub use nasa_rover::nasa_rover;
pub use stuck_car::stuck_car_1o;

/// Names accepted by [`build`].
pub const NAMES: &[&str] = &["full_conc", "stuck_car_1o", "nasa_rover"];

/// Construct a reference domain by name.
///
/// `object_amount` scales `nasa_rover`. No bundled domain has garbage actions,
/// so a non-zero `garbage_amount` is rejected.
pub fn build(
    name: &str,
    kind: DomainKind,
    deadline: u32,
    object_amount: u32,
    garbage_amount: u32,
) -> Result<Domain, MdpError> {
    if garbage_amount != 0 && NAMES.contains(&name) {
        return Err(MdpError::InvalidConfig(format!(
            "domain '{name}' has no garbage actions, garbage_amount must be 0 (got {garbage_amount})"
        )));
    }
    match name {
        "full_conc" => full_conc(kind, deadline),
        "stuck_car_1o" => stuck_car_1o(kind, deadline),
        "nasa_rover" => nasa_rover(kind, deadline, object_amount),
        other => Err(MdpError::UnknownDomain {
            name: other.to_string(),
            known: NAMES.join(", "),
        }),
    }
}
