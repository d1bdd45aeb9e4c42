// Wheel speed desaturation
//
// If any module is asked to go faster than the platform can, all modules are
// scaled by the same factor so the chassis still follows the commanded path.

use super::kinematics::ModuleState;

/// Scale module speeds down so none exceeds `max_speed` (m/s).
///
/// Angles are untouched. When the fastest module is already within the limit
/// the states are left exactly as they were. Returns the factor applied.
///
/// If a speed overflowed to infinity, that module runs at `max_speed` in its
/// own direction and every other module (NaN included) scales to zero
/// against it; the returned factor is then 0.
pub fn desaturate_wheel_speeds(states: &mut [ModuleState], max_speed: f64) -> f64 {
    let peak = states
        .iter()
        .map(|state| if state.speed.is_nan() { f64::INFINITY } else { state.speed.abs() })
        .fold(0.0f64, f64::max);

    if !peak.is_finite() {
        for state in states.iter_mut() {
            state.speed = if state.speed.is_infinite() {
                max_speed.copysign(state.speed)
            } else {
                0.0
            };
        }
        return 0.0;
    }

    if peak <= max_speed {
        return 1.0;
    }

    let scale = max_speed / peak;
    for state in states.iter_mut() {
        state.speed *= scale;
    }
    scale
}
