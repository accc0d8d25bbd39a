//! Typed payload layouts of every CAN-simple command.
//!
//! Each structure carries its static signal layout (the bit-exact wire
//! contract) and implements [`FromPayload`] / [`ToPayload`] through the signal
//! engine. All multi-byte fields are little-endian; floats are raw IEEE-754.
use crate::{
    core::{Payload, SignalDescriptor, SignalValue},
    error::CodecError,
    infra::codec::{
        signal,
        traits::{FromPayload, SignalLayout, ToPayload},
    },
};

/// Narrowing from a decoded [`SignalValue`] to a field type.
trait FromSignal {
    fn from_signal(value: SignalValue) -> Self;
}

impl FromSignal for f32 {
    fn from_signal(value: SignalValue) -> Self {
        value.as_f32()
    }
}

impl FromSignal for u32 {
    fn from_signal(value: SignalValue) -> Self {
        value.as_u32()
    }
}

impl FromSignal for i32 {
    fn from_signal(value: SignalValue) -> Self {
        value.as_i32()
    }
}

/// Declare a payload structure; each field is paired with its descriptor.
macro_rules! message {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$field_meta:meta])* $field:ident : $ty:ty = $desc:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $name {
            $( $(#[$field_meta])* pub $field: $ty ),+
        }

        impl SignalLayout for $name {
            const LAYOUT: &'static [SignalDescriptor] = &[ $( $desc ),+ ];
        }

        impl ToPayload for $name {
            fn write_payload(&self, payload: &mut Payload) -> Result<(), CodecError> {
                $( signal::encode(payload, &$desc, self.$field)?; )+
                Ok(())
            }
        }

        impl FromPayload for $name {
            fn from_payload(payload: &Payload) -> Result<Self, CodecError> {
                Ok(Self {
                    $( $field: <$ty as FromSignal>::from_signal(signal::decode(payload, &$desc)?) ),+
                })
            }
        }
    };
}

//==================================================================================STATUS

message! {
    /// Heartbeat broadcast (0x001).
    Heartbeat {
        /// Axis error bitmask.
        axis_error: u32 = SignalDescriptor::unsigned("AxisError", 0, 32),
        /// Current axis state, as its raw discriminant.
        current_state: u32 = SignalDescriptor::unsigned("CurrentState", 32, 32),
    }
}

message! {
    /// Motor / encoder / sensorless error report (0x003, 0x004, 0x005).
    ErrorReport {
        error: u32 = SignalDescriptor::unsigned("Error", 0, 32),
    }
}

message! {
    /// Position and velocity estimates (0x009 encoder, 0x015 sensorless).
    Estimates {
        pos_estimate: f32 = SignalDescriptor::float32("PosEstimate", 0),
        vel_estimate: f32 = SignalDescriptor::float32("VelEstimate", 32),
    }
}

message! {
    /// Raw encoder counts (0x00A).
    EncoderCount {
        shadow_count: i32 = SignalDescriptor::signed("ShadowCount", 0, 32),
        count_in_cpr: i32 = SignalDescriptor::signed("CountInCpr", 32, 32),
    }
}

message! {
    /// Current setpoint in the rotor frame (0x014).
    Iq {
        id_setpoint: f32 = SignalDescriptor::float32("IdSetpoint", 0),
        iq_setpoint: f32 = SignalDescriptor::float32("IqSetpoint", 32),
    }
}

message! {
    /// DC bus voltage (0x017).
    VbusVoltage {
        vbus_voltage: f32 = SignalDescriptor::float32("VbusVoltage", 0),
    }
}

//==================================================================================AXIS

message! {
    /// New node id for the receiving axis (0x006).
    SetAxisNodeId {
        node_id: u32 = SignalDescriptor::unsigned("NodeId", 0, 32),
    }
}

message! {
    /// Requested axis state (0x007). Only the low 16 bits travel.
    SetAxisRequestedState {
        requested_state: i32 = SignalDescriptor::signed("RequestedState", 0, 16),
    }
}

message! {
    /// Linear encoder count override (0x019).
    SetLinearCount {
        linear_count: i32 = SignalDescriptor::signed("LinearCount", 0, 32),
    }
}

message! {
    /// Periodic telemetry subscription request (0x01A).
    ///
    /// An interval of zero cancels an existing subscription.
    SetPeriodicUpdate {
        command_id: u32 = SignalDescriptor::unsigned("CommandId", 0, 32),
        interval_ms: u32 = SignalDescriptor::unsigned("IntervalMs", 32, 32),
    }
}

//==================================================================================CONTROLLER

message! {
    /// Control and input modes (0x00B), as raw discriminants.
    SetControllerModes {
        control_mode: i32 = SignalDescriptor::signed("ControlMode", 0, 32),
        input_mode: i32 = SignalDescriptor::signed("InputMode", 32, 32),
    }
}

message! {
    /// Position setpoint with fixed-point feed-forward terms (0x00C).
    SetInputPos {
        input_pos: f32 = SignalDescriptor::float32("InputPos", 0),
        /// Velocity feed-forward, 0.001 per bit.
        vel_ff: f32 = SignalDescriptor::signed("VelFf", 32, 16).scaled(0.001, 0.0),
        /// Torque feed-forward, 0.001 per bit.
        torque_ff: f32 = SignalDescriptor::signed("TorqueFf", 48, 16).scaled(0.001, 0.0),
    }
}

message! {
    /// Velocity setpoint (0x00D).
    SetInputVel {
        input_vel: f32 = SignalDescriptor::float32("InputVel", 0),
        torque_ff: f32 = SignalDescriptor::float32("TorqueFf", 32),
    }
}

message! {
    /// Torque setpoint (0x00E).
    SetInputTorque {
        input_torque: f32 = SignalDescriptor::float32("InputTorque", 0),
    }
}

message! {
    /// Controller velocity limit (0x00F).
    SetVelLimit {
        vel_limit: f32 = SignalDescriptor::float32("VelLimit", 0),
    }
}

message! {
    /// Trajectory inertia (0x013).
    SetTrajInertia {
        inertia: f32 = SignalDescriptor::float32("Inertia", 0),
    }
}

//==================================================================================TRAJECTORY

message! {
    /// Trapezoidal trajectory velocity limit (0x011).
    SetTrajVelLimit {
        vel_limit: f32 = SignalDescriptor::float32("TrajVelLimit", 0),
    }
}

message! {
    /// Trapezoidal trajectory acceleration limits (0x012).
    SetTrajAccelLimits {
        accel_limit: f32 = SignalDescriptor::float32("AccelLimit", 0),
        decel_limit: f32 = SignalDescriptor::float32("DecelLimit", 32),
    }
}
