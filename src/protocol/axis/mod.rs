//! Per-axis state touched by the CAN-simple protocol.
//!
//! The motor, encoder, estimator, controller and trajectory planner are
//! external subsystems; only the fields the protocol reads or writes live here,
//! as plain data. Side effects that belong to those subsystems go through
//! [`AxisEvents`].
use crate::protocol::periodic::{PeriodicTable, PERIODIC_SLOTS};

//==================================================================================ENUMS

/// Declare a `#[repr(i32)]` enum decodable from its raw discriminant.
macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(i32)]
        pub enum $name {
            #[default]
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $name {
            /// Raw wire discriminant.
            #[inline]
            pub const fn raw(self) -> i32 {
                self as i32
            }
        }

        impl TryFrom<i32> for $name {
            type Error = i32;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Self::$variant), )+
                    other => Err(other),
                }
            }
        }
    };
}

raw_enum! {
    /// Axis state machine states.
    AxisState {
        Undefined = 0,
        Idle = 1,
        StartupSequence = 2,
        FullCalibrationSequence = 3,
        MotorCalibration = 4,
        EncoderIndexSearch = 6,
        EncoderOffsetCalibration = 7,
        ClosedLoopControl = 8,
        LockinSpin = 9,
        EncoderDirFind = 10,
        Homing = 11,
        EncoderHallPolarityCalibration = 12,
        EncoderHallPhaseCalibration = 13,
    }
}

raw_enum! {
    /// Controller loop selection.
    ControlMode {
        VoltageControl = 0,
        TorqueControl = 1,
        VelocityControl = 2,
        PositionControl = 3,
    }
}

raw_enum! {
    /// How setpoints are shaped before reaching the controller.
    InputMode {
        Inactive = 0,
        Passthrough = 1,
        VelRamp = 2,
        PosFilter = 3,
        MixChannels = 4,
        TrapTraj = 5,
        TorqueRamp = 6,
        Mirror = 7,
        Tuning = 8,
    }
}

//==================================================================================ERRORS

/// Axis error bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisError(pub u32);

impl AxisError {
    pub const NONE: Self = Self(0);
    pub const INVALID_STATE: Self = Self(0x0000_0001);
    pub const WATCHDOG_TIMER_EXPIRED: Self = Self(0x0000_0800);
    pub const MIN_ENDSTOP_PRESSED: Self = Self(0x0000_1000);
    pub const MAX_ENDSTOP_PRESSED: Self = Self(0x0000_2000);
    pub const ESTOP_REQUESTED: Self = Self(0x0000_4000);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

//==================================================================================SUBSYSTEMS

/// Motor state visible to the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motor {
    pub error: u32,
    /// Current setpoint `(Id, Iq)`; `None` while the current loop is idle.
    pub idq_setpoint: Option<(f32, f32)>,
}

/// Encoder state visible to the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Encoder {
    pub error: u32,
    pub pos_estimate: Option<f32>,
    pub vel_estimate: Option<f32>,
    pub shadow_count: i32,
    pub count_in_cpr: i32,
}

/// Sensorless estimator state visible to the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorlessEstimator {
    pub error: u32,
    pub pll_pos: f32,
    pub vel_estimate: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerConfig {
    pub control_mode: ControlMode,
    pub input_mode: InputMode,
    pub vel_limit: f32,
    pub inertia: f32,
}

/// Controller setpoints and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Controller {
    pub input_pos: f32,
    pub input_vel: f32,
    pub input_torque: f32,
    pub config: ControllerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrapTrajConfig {
    pub vel_limit: f32,
    pub accel_limit: f32,
    pub decel_limit: f32,
}

/// Trapezoidal trajectory planner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrapTraj {
    pub config: TrapTrajConfig,
}

//==================================================================================HOOKS

/// Side effects owned by the motor-control firmware.
///
/// Every hook defaults to a no-op, so `()` is a valid implementation.
pub trait AxisEvents {
    /// Any frame addressed to the axis was received.
    fn watchdog_feed(&mut self) {}

    /// A new position setpoint was written.
    fn input_pos_updated(&mut self) {}

    /// Start the anticogging calibration routine.
    fn start_anticogging_calibration(&mut self) {}

    /// Overwrite the linear encoder count.
    fn set_linear_count(&mut self, _count: i32) {}
}

impl AxisEvents for () {}

//==================================================================================CONFIG

/// CAN addressing and telemetry subscriptions of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanConfig {
    pub node_id: u32,
    pub is_extended: bool,
    pub periodic: PeriodicTable<PERIODIC_SLOTS>,
}

impl CanConfig {
    /// Standard-frame configuration without subscriptions.
    pub const fn new(node_id: u32) -> Self {
        Self {
            node_id,
            is_extended: false,
            periodic: PeriodicTable::new(),
        }
    }

    pub const fn extended(mut self, is_extended: bool) -> Self {
        self.is_extended = is_extended;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisConfig {
    pub can: CanConfig,
}

//==================================================================================AXIS

/// One hosted axis.
#[derive(Debug)]
pub struct Axis<E: AxisEvents> {
    pub config: AxisConfig,
    pub error: AxisError,
    pub current_state: AxisState,
    pub requested_state: AxisState,
    pub motor: Motor,
    pub encoder: Encoder,
    pub sensorless: SensorlessEstimator,
    pub controller: Controller,
    pub trap_traj: TrapTraj,
    pub events: E,
}

impl<E: AxisEvents> Axis<E> {
    pub fn new(can: CanConfig, events: E) -> Self {
        Self {
            config: AxisConfig { can },
            error: AxisError::NONE,
            current_state: AxisState::Idle,
            requested_state: AxisState::Undefined,
            motor: Motor::default(),
            encoder: Encoder::default(),
            sensorless: SensorlessEstimator::default(),
            controller: Controller::default(),
            trap_traj: TrapTraj::default(),
            events,
        }
    }

    #[inline]
    pub fn node_id(&self) -> u32 {
        self.config.can.node_id
    }

    #[inline]
    pub fn is_extended(&self) -> bool {
        self.config.can.is_extended
    }

    /// `true` when a frame for `(node_id, extended)` belongs to this axis.
    #[inline]
    pub fn matches(&self, node_id: u32, extended: bool) -> bool {
        self.config.can.node_id == node_id && self.config.can.is_extended == extended
    }

    /// Reset the error state of the axis and of each sub-module.
    pub fn clear_errors(&mut self) {
        self.error = AxisError::NONE;
        self.motor.error = 0;
        self.encoder.error = 0;
        self.sensorless.error = 0;
    }
}
