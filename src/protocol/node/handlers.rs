//! Per-command handlers: control payloads applied to an axis, and the
//! outgoing payload of every command with an encoder.
use crate::{
    core::Payload,
    error::CodecError,
    infra::codec::traits::{FromPayload, ToPayload},
    protocol::{
        axis::{Axis, AxisEvents, AxisState, ControlMode, InputMode},
        commands::Command,
        messages::{
            EncoderCount, ErrorReport, Estimates, Heartbeat, Iq, SetAxisNodeId,
            SetAxisRequestedState, SetControllerModes, SetInputPos, SetInputTorque, SetInputVel,
            SetLinearCount, SetPeriodicUpdate, SetTrajAccelLimits, SetTrajInertia, SetTrajVelLimit,
            SetVelLimit, VbusVoltage,
        },
    },
};

//==================================================================================INCOMING

/// Decode a control payload and write it into `axis`.
///
/// Commands without a control handler are left untouched.
pub(crate) fn apply_control<E: AxisEvents>(
    axis: &mut Axis<E>,
    command: Command,
    payload: &Payload,
) -> Result<(), CodecError> {
    match command {
        Command::SetAxisNodeId => {
            let msg = SetAxisNodeId::from_payload(payload)?;
            #[cfg(feature = "defmt")]
            defmt::info!("node id {} -> {}", axis.config.can.node_id, msg.node_id);
            axis.config.can.node_id = msg.node_id;
        }
        Command::SetAxisRequestedState => {
            let msg = SetAxisRequestedState::from_payload(payload)?;
            if let Some(state) = known::<AxisState>(msg.requested_state) {
                axis.requested_state = state;
            }
        }
        Command::SetControllerModes => {
            let msg = SetControllerModes::from_payload(payload)?;
            if let Some(mode) = known::<ControlMode>(msg.control_mode) {
                axis.controller.config.control_mode = mode;
            }
            if let Some(mode) = known::<InputMode>(msg.input_mode) {
                axis.controller.config.input_mode = mode;
            }
        }
        Command::SetInputPos => {
            let msg = SetInputPos::from_payload(payload)?;
            axis.controller.input_pos = msg.input_pos;
            axis.controller.input_vel = msg.vel_ff;
            axis.controller.input_torque = msg.torque_ff;
            axis.events.input_pos_updated();
        }
        Command::SetInputVel => {
            let msg = SetInputVel::from_payload(payload)?;
            axis.controller.input_vel = msg.input_vel;
            axis.controller.input_torque = msg.torque_ff;
        }
        Command::SetInputTorque => {
            axis.controller.input_torque = SetInputTorque::from_payload(payload)?.input_torque;
        }
        Command::SetVelLimit => {
            axis.controller.config.vel_limit = SetVelLimit::from_payload(payload)?.vel_limit;
        }
        Command::SetTrajVelLimit => {
            axis.trap_traj.config.vel_limit = SetTrajVelLimit::from_payload(payload)?.vel_limit;
        }
        Command::SetTrajAccelLimits => {
            let msg = SetTrajAccelLimits::from_payload(payload)?;
            axis.trap_traj.config.accel_limit = msg.accel_limit;
            axis.trap_traj.config.decel_limit = msg.decel_limit;
        }
        Command::SetTrajInertia => {
            axis.controller.config.inertia = SetTrajInertia::from_payload(payload)?.inertia;
        }
        Command::SetLinearCount => {
            let msg = SetLinearCount::from_payload(payload)?;
            axis.events.set_linear_count(msg.linear_count);
        }
        Command::SetPeriodicUpdate => {
            let msg = SetPeriodicUpdate::from_payload(payload)?;
            let _outcome = axis
                .config
                .can
                .periodic
                .subscribe(msg.command_id, msg.interval_ms);
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "periodic {:#x} every {} ms: {}",
                msg.command_id,
                msg.interval_ms,
                _outcome
            );
        }
        _ => {}
    }
    Ok(())
}

/// Typed value of a raw discriminant; unknown values are logged and dropped.
fn known<T: TryFrom<i32, Error = i32>>(raw: i32) -> Option<T> {
    match T::try_from(raw) {
        Ok(value) => Some(value),
        Err(_raw) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("unknown discriminant {}, field left unchanged", _raw);
            None
        }
    }
}

//==================================================================================OUTGOING

/// Outgoing payload of `command` for `axis`, or `None` when the command has no
/// encoder. Missing estimates are reported as zero.
pub(crate) fn telemetry<E: AxisEvents>(
    axis: &Axis<E>,
    vbus_voltage: f32,
    command: Command,
) -> Result<Option<Payload>, CodecError> {
    let payload = match command {
        Command::Heartbeat => Heartbeat {
            axis_error: axis.error.bits(),
            current_state: axis.current_state.raw() as u32,
        }
        .to_payload()?,
        Command::GetMotorError => ErrorReport {
            error: axis.motor.error,
        }
        .to_payload()?,
        Command::GetEncoderError => ErrorReport {
            error: axis.encoder.error,
        }
        .to_payload()?,
        Command::GetSensorlessError => ErrorReport {
            error: axis.sensorless.error,
        }
        .to_payload()?,
        Command::GetEncoderEstimates => Estimates {
            pos_estimate: axis.encoder.pos_estimate.unwrap_or(0.0),
            vel_estimate: axis.encoder.vel_estimate.unwrap_or(0.0),
        }
        .to_payload()?,
        Command::GetEncoderCount => EncoderCount {
            shadow_count: axis.encoder.shadow_count,
            count_in_cpr: axis.encoder.count_in_cpr,
        }
        .to_payload()?,
        Command::GetIq => {
            let (id_setpoint, iq_setpoint) = axis.motor.idq_setpoint.unwrap_or((0.0, 0.0));
            Iq {
                id_setpoint,
                iq_setpoint,
            }
            .to_payload()?
        }
        Command::GetSensorlessEstimates => Estimates {
            pos_estimate: axis.sensorless.pll_pos,
            vel_estimate: axis.sensorless.vel_estimate.unwrap_or(0.0),
        }
        .to_payload()?,
        Command::GetVbusVoltage => VbusVoltage { vbus_voltage }.to_payload()?,
        _ => return Ok(None),
    };
    Ok(Some(payload))
}
