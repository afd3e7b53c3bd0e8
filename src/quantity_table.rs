//! Static table mapping named physical quantities to their dimensionality.

use crate::dimensionality::{BaseDimension::*, Dimensionality};
use crate::errors::SiqError;

fn table() -> Vec<(&'static str, Dimensionality)> {
    let l = Dimensionality::for_base(Length);
    let m = Dimensionality::for_base(Mass);
    let t = Dimensionality::for_base(Time);
    let i = Dimensionality::for_base(Current);
    let theta = Dimensionality::for_base(Temperature);
    let n = Dimensionality::for_base(Amount);
    let j = Dimensionality::for_base(LuminousIntensity);
    let dimensionless = Dimensionality::DIMENSIONLESS;

    let area = l.power(2);
    let volume = l.power(3);
    let velocity = l.divide(&t);
    let acceleration = velocity.divide(&t);
    let frequency = dimensionless.divide(&t);
    let force = m.multiply(&acceleration);
    let pressure = force.divide(&area);
    let energy = force.multiply(&l);
    let power = energy.divide(&t);
    let charge = i.multiply(&t);
    let voltage = power.divide(&i);
    let capacitance = charge.divide(&voltage);
    let resistance = voltage.divide(&i);
    let conductance = dimensionless.divide(&resistance);
    let inductance = voltage.multiply(&t).divide(&i);
    let magnetic_flux = voltage.multiply(&t);
    let magnetic_flux_density = magnetic_flux.divide(&area);
    let density = m.divide(&volume);
    let momentum = m.multiply(&velocity);
    let angular_velocity = dimensionless.divide(&t);
    let viscosity = pressure.multiply(&t);
    let molarity = n.divide(&volume);
    let molar_mass = m.divide(&n);
    let electric_field_strength = voltage.divide(&l);
    let surface_tension = force.divide(&l);
    let torque = force.multiply(&l);
    let luminous_flux = j;
    let illuminance = j.divide(&area);
    let catalytic_activity = n.divide(&t);
    let specific_heat_capacity = energy.divide(&m).divide(&theta);
    let thermal_conductivity = power.divide(&l).divide(&theta);
    let electric_dipole_moment = charge.multiply(&l);
    let angular_momentum = momentum.multiply(&l);
    let gyromagnetic_ratio = angular_velocity.divide(&magnetic_flux_density);

    vec![
        ("length", l),
        ("mass", m),
        ("time", t),
        ("current", i),
        ("temperature", theta),
        ("amount", n),
        ("luminous intensity", j),
        ("dimensionless", dimensionless),
        ("area", area),
        ("volume", volume),
        ("velocity", velocity),
        ("speed", velocity),
        ("acceleration", acceleration),
        ("frequency", frequency),
        ("force", force),
        ("pressure", pressure),
        ("energy", energy),
        ("work", energy),
        ("power", power),
        ("charge", charge),
        ("voltage", voltage),
        ("electric potential difference", voltage),
        ("capacitance", capacitance),
        ("resistance", resistance),
        ("conductance", conductance),
        ("inductance", inductance),
        ("magnetic flux", magnetic_flux),
        ("magnetic flux density", magnetic_flux_density),
        ("density", density),
        ("momentum", momentum),
        ("angular velocity", angular_velocity),
        ("viscosity", viscosity),
        ("molarity", molarity),
        ("molar mass", molar_mass),
        ("electric field strength", electric_field_strength),
        ("surface tension", surface_tension),
        ("torque", torque),
        ("luminous flux", luminous_flux),
        ("illuminance", illuminance),
        ("catalytic activity", catalytic_activity),
        ("specific heat capacity", specific_heat_capacity),
        ("thermal conductivity", thermal_conductivity),
        ("electric dipole moment", electric_dipole_moment),
        ("angular momentum", angular_momentum),
        ("gyromagnetic ratio", gyromagnetic_ratio),
    ]
}

pub fn dimensionality_for_quantity(name: &str) -> Result<Dimensionality, SiqError> {
    let needle = name.to_lowercase();
    table()
        .into_iter()
        .find(|(n, _)| *n == needle)
        .map(|(_, d)| d)
        .ok_or_else(|| SiqError::UnknownQuantity { name: name.to_string() })
}
