use super::*;
use crate::protocol::axis::{AxisState, CanConfig, ControlMode, InputMode};
use crate::protocol::periodic::PeriodicEntry;

#[derive(Debug, Default, Clone, PartialEq)]
struct Recorder {
    watchdog: u32,
    input_pos_updated: u32,
    anticogging: u32,
    linear_count: Option<i32>,
}

impl AxisEvents for Recorder {
    fn watchdog_feed(&mut self) {
        self.watchdog += 1;
    }
    fn input_pos_updated(&mut self) {
        self.input_pos_updated += 1;
    }
    fn start_anticogging_calibration(&mut self) {
        self.anticogging += 1;
    }
    fn set_linear_count(&mut self, count: i32) {
        self.linear_count = Some(count);
    }
}

/// Two standard-frame axes (nodes 3 and 4) and one extended axis (node 3).
fn node() -> Node<Recorder, 3> {
    Node::new([
        Axis::new(CanConfig::new(3), Recorder::default()),
        Axis::new(CanConfig::new(4), Recorder::default()),
        Axis::new(CanConfig::new(3).extended(true), Recorder::default()),
    ])
    .unwrap()
}

fn data(node_id: u32, command: Command, bytes: &[u8]) -> CanFrame {
    CanFrame::new(CanId::new(node_id, command.id()), false, bytes)
}

fn query(node_id: u32, command: Command) -> CanFrame {
    CanFrame::remote(CanId::new(node_id, command.id()), false)
}

fn set_input_pos_payload() -> [u8; 8] {
    let mut payload = [0u8; 8];
    payload[..4].copy_from_slice(&1.5f32.to_le_bytes());
    payload[4..6].copy_from_slice(&500i16.to_le_bytes());
    payload[6..8].copy_from_slice(&(-200i16).to_le_bytes());
    payload
}

//==================================================================================ROUTING

#[test]
/// Position setpoint with feed-forward lands on node 3 and fires its hook once.
fn test_set_input_pos_end_to_end() {
    let mut node = node();
    let frame = data(3, Command::SetInputPos, &set_input_pos_payload());
    assert_eq!(frame.id.raw(), (3 << 5) | 0x0C);

    assert_eq!(node.route(&frame).unwrap(), Dispatch::Applied);

    let axis = &node.axes()[0];
    assert_eq!(axis.controller.input_pos, 1.5);
    assert!((axis.controller.input_vel - 0.5).abs() < 1e-6);
    assert!((axis.controller.input_torque + 0.2).abs() < 1e-6);
    assert_eq!(axis.events.input_pos_updated, 1);
    assert_eq!(axis.events.watchdog, 1);
}

#[test]
/// A frame for one axis leaves every other axis untouched, including the one
/// sharing its node id on the other frame format.
fn test_dispatch_isolation() {
    let mut node = node();
    let before_4 = node.axes()[1].controller;
    let before_ext = node.axes()[2].controller;

    node.route(&data(3, Command::SetInputPos, &set_input_pos_payload()))
        .unwrap();
    node.route(&data(3, Command::SetVelLimit, &7.0f32.to_le_bytes()))
        .unwrap();

    assert_eq!(node.axes()[1].controller, before_4);
    assert_eq!(node.axes()[2].controller, before_ext);
    assert_eq!(node.axes()[1].events, Recorder::default());
    assert_eq!(node.axes()[2].events, Recorder::default());
    assert_eq!(node.axes()[0].controller.config.vel_limit, 7.0);
}

#[test]
fn test_unroutable_frame() {
    let mut node = node();
    let frame = data(9, Command::SetInputTorque, &1.0f32.to_le_bytes());
    assert_eq!(node.route(&frame).unwrap(), Dispatch::Unroutable);
    assert!(node.axes().iter().all(|axis| axis.events.watchdog == 0));
}

#[test]
/// Unknown ids are accepted, feed the watchdog, and change nothing else.
fn test_unknown_command_ignored() {
    let mut node = node();
    let frame = CanFrame::new(CanId::new(4, 0x1D), false, &[0xFF; 8]);
    assert_eq!(node.route(&frame).unwrap(), Dispatch::Ignored);
    assert_eq!(node.axes()[1].events.watchdog, 1);
    assert_eq!(node.axes()[1].controller, Default::default());
}

#[test]
/// Reserved ids and an incoming heartbeat are no-ops.
fn test_reserved_and_broadcast_ignored() {
    let mut node = node();
    for command in [Command::NmtControl, Command::SetAxisStartupConfig, Command::Heartbeat] {
        assert_eq!(node.route(&data(3, command, &[1; 8])).unwrap(), Dispatch::Ignored);
        assert_eq!(node.route(&query(3, command)).unwrap(), Dispatch::Ignored);
    }
}

//==================================================================================QUERIES

#[test]
/// Bus voltage query answered with the node's own id and an 8-byte payload.
fn test_vbus_query_response() {
    let mut node = node();
    node.vbus_voltage = 24.5;

    let Dispatch::Respond(response) = node.route(&query(3, Command::GetVbusVoltage)).unwrap()
    else {
        panic!("expected a response");
    };
    assert_eq!(response.id.raw(), (3 << 5) | 0x17);
    assert!(!response.extended);
    assert!(!response.remote_request);
    assert_eq!(response.len, 8);
    assert_eq!(&response.data[..4], &24.5f32.to_le_bytes());
    assert_eq!(&response.data[4..], &[0; 4]);
}

#[test]
/// Without the remote-request flag a query is not answered.
fn test_query_requires_rtr() {
    let mut node = node();
    let frame = data(3, Command::GetVbusVoltage, &[]);
    assert_eq!(node.route(&frame).unwrap(), Dispatch::Ignored);
}

#[test]
/// Responses keep the extended flag of the answering axis.
fn test_extended_axis_response() {
    let mut node = node();
    node.axes_mut()[2].encoder.shadow_count = -42;
    node.axes_mut()[2].encoder.count_in_cpr = 17;

    let frame = CanFrame::remote(CanId::new(3, Command::GetEncoderCount.id()), true);
    let Dispatch::Respond(response) = node.route(&frame).unwrap() else {
        panic!("expected a response");
    };
    assert!(response.extended);
    assert_eq!(&response.data[..4], &(-42i32).to_le_bytes());
    assert_eq!(&response.data[4..], &17i32.to_le_bytes());
}

#[test]
/// Missing estimates and an idle current loop read as zero.
fn test_missing_values_read_zero() {
    let mut node = node();
    for command in [Command::GetEncoderEstimates, Command::GetIq] {
        let Dispatch::Respond(response) = node.route(&query(4, command)).unwrap() else {
            panic!("expected a response");
        };
        assert_eq!(response.data, [0; 8]);
    }

    node.axes_mut()[1].motor.idq_setpoint = Some((0.25, -3.0));
    let Dispatch::Respond(response) = node.route(&query(4, Command::GetIq)).unwrap() else {
        panic!("expected a response");
    };
    assert_eq!(&response.data[..4], &0.25f32.to_le_bytes());
    assert_eq!(&response.data[4..], &(-3.0f32).to_le_bytes());
}

#[test]
fn test_sensorless_estimates() {
    let mut node = node();
    node.axes_mut()[0].sensorless.pll_pos = 2.0;
    node.axes_mut()[0].sensorless.vel_estimate = Some(-1.5);
    let Dispatch::Respond(response) = node
        .route(&query(3, Command::GetSensorlessEstimates))
        .unwrap()
    else {
        panic!("expected a response");
    };
    assert_eq!(&response.data[..4], &2.0f32.to_le_bytes());
    assert_eq!(&response.data[4..], &(-1.5f32).to_le_bytes());
}

//==================================================================================CONTROL

#[test]
/// The new node id applies immediately: the old id stops routing.
fn test_set_axis_node_id() {
    let mut node = node();
    node.route(&data(4, Command::SetAxisNodeId, &12u32.to_le_bytes()))
        .unwrap();
    assert_eq!(node.axes()[1].node_id(), 12);

    let torque = data(4, Command::SetInputTorque, &1.0f32.to_le_bytes());
    assert_eq!(node.route(&torque).unwrap(), Dispatch::Unroutable);
    let torque = data(12, Command::SetInputTorque, &1.0f32.to_le_bytes());
    assert_eq!(node.route(&torque).unwrap(), Dispatch::Applied);
    assert_eq!(node.axes()[1].controller.input_torque, 1.0);
}

#[test]
/// Known discriminants are applied, unknown ones leave the field as it was.
fn test_state_and_modes() {
    let mut node = node();
    node.route(&data(3, Command::SetAxisRequestedState, &8i16.to_le_bytes()))
        .unwrap();
    assert_eq!(node.axes()[0].requested_state, AxisState::ClosedLoopControl);

    node.route(&data(3, Command::SetAxisRequestedState, &5i16.to_le_bytes()))
        .unwrap();
    assert_eq!(node.axes()[0].requested_state, AxisState::ClosedLoopControl);

    let mut modes = [0u8; 8];
    modes[..4].copy_from_slice(&3i32.to_le_bytes());
    modes[4..].copy_from_slice(&5i32.to_le_bytes());
    node.route(&data(3, Command::SetControllerModes, &modes)).unwrap();
    let config = node.axes()[0].controller.config;
    assert_eq!(config.control_mode, ControlMode::PositionControl);
    assert_eq!(config.input_mode, InputMode::TrapTraj);

    modes[..4].copy_from_slice(&99i32.to_le_bytes());
    modes[4..].copy_from_slice(&1i32.to_le_bytes());
    node.route(&data(3, Command::SetControllerModes, &modes)).unwrap();
    let config = node.axes()[0].controller.config;
    assert_eq!(config.control_mode, ControlMode::PositionControl);
    assert_eq!(config.input_mode, InputMode::Passthrough);
}

#[test]
fn test_trajectory_and_velocity_setpoints() {
    let mut node = node();
    let mut payload = [0u8; 8];
    payload[..4].copy_from_slice(&10.0f32.to_le_bytes());
    payload[4..].copy_from_slice(&20.0f32.to_le_bytes());

    node.route(&data(4, Command::SetTrajAccelLimits, &payload)).unwrap();
    node.route(&data(4, Command::SetTrajVelLimit, &5.0f32.to_le_bytes()))
        .unwrap();
    node.route(&data(4, Command::SetTrajInertia, &0.5f32.to_le_bytes()))
        .unwrap();
    node.route(&data(4, Command::SetInputVel, &payload)).unwrap();

    let axis = &node.axes()[1];
    assert_eq!(axis.trap_traj.config.accel_limit, 10.0);
    assert_eq!(axis.trap_traj.config.decel_limit, 20.0);
    assert_eq!(axis.trap_traj.config.vel_limit, 5.0);
    assert_eq!(axis.controller.config.inertia, 0.5);
    assert_eq!(axis.controller.input_vel, 10.0);
    assert_eq!(axis.controller.input_torque, 20.0);
    assert_eq!(axis.events.input_pos_updated, 0);
}

#[test]
fn test_linear_count_hook() {
    let mut node = node();
    node.route(&data(3, Command::SetLinearCount, &(-1000i32).to_le_bytes()))
        .unwrap();
    assert_eq!(node.axes()[0].events.linear_count, Some(-1000));
}

//==================================================================================ACTIONS

#[test]
/// E-stop flags one axis; clear errors resets every axis of the node.
fn test_estop_then_clear_errors() {
    let mut node = node();
    assert_eq!(node.route(&data(3, Command::Estop, &[])).unwrap(), Dispatch::Applied);
    assert!(node.axes()[0].error.contains(AxisError::ESTOP_REQUESTED));
    assert!(node.axes()[1].error.is_empty());

    node.axes_mut()[1].motor.error = 0x80;
    assert_eq!(
        node.route(&data(3, Command::ClearErrors, &[])).unwrap(),
        Dispatch::Applied
    );
    assert!(node.axes()[0].error.is_empty());
    assert_eq!(node.axes()[1].motor.error, 0);
}

#[test]
fn test_start_anticogging() {
    let mut node = node();
    node.route(&data(4, Command::StartAnticogging, &[])).unwrap();
    assert_eq!(node.axes()[1].events.anticogging, 1);
    assert_eq!(node.axes()[0].events.anticogging, 0);
}

#[test]
/// Reboot becomes an effect for the caller; no state changes.
fn test_reboot_is_restart_effect() {
    let mut node = node();
    assert_eq!(node.route(&data(3, Command::Reboot, &[])).unwrap(), Dispatch::Restart);
    assert_eq!(node.route(&query(3, Command::Reboot)).unwrap(), Dispatch::Restart);
}

//==================================================================================CYCLIC

fn subscribe(node: &mut Node<Recorder, 3>, node_id: u32, command: Command, interval_ms: u32) {
    let mut payload = [0u8; 8];
    payload[..4].copy_from_slice(&(command.id() as u32).to_le_bytes());
    payload[4..].copy_from_slice(&interval_ms.to_le_bytes());
    node.route(&data(node_id, Command::SetPeriodicUpdate, &payload))
        .unwrap();
}

#[test]
/// interval 100 from 0: one frame at 150, none at 200.
fn test_cyclic_firing() {
    let mut node = node();
    node.vbus_voltage = 12.0;
    subscribe(&mut node, 3, Command::GetVbusVoltage, 100);

    let mut frames = Vec::new();
    let sent = node.poll_cyclic(150, |frame| {
        frames.push(frame.clone());
        Ok::<(), ()>(())
    });
    assert_eq!(sent, 1);
    assert_eq!(frames[0].id.raw(), (3 << 5) | 0x17);
    assert_eq!(&frames[0].data[..4], &12.0f32.to_le_bytes());
    assert_eq!(node.axes()[0].config.can.periodic.active()[0].last_fire_ms, 150);

    assert_eq!(node.poll_cyclic(200, |_| Ok::<(), ()>(())), 0);
}

#[test]
/// A refused frame keeps its old fire time and goes out on the next scan.
fn test_cyclic_retry_after_failure() {
    let mut node = node();
    subscribe(&mut node, 4, Command::Heartbeat, 10);

    assert_eq!(node.poll_cyclic(10, |_| Err(())), 0);
    assert_eq!(node.axes()[1].config.can.periodic.active()[0].last_fire_ms, 0);
    assert_eq!(node.poll_cyclic(11, |_| Ok::<(), ()>(())), 1);
    assert_eq!(node.axes()[1].config.can.periodic.active()[0].last_fire_ms, 11);
}

#[test]
/// Periodic update requests edit the table of the addressed axis only.
fn test_subscription_via_frames() {
    let mut node = node();
    subscribe(&mut node, 3, Command::GetEncoderCount, 50);
    subscribe(&mut node, 3, Command::Heartbeat, 100);
    subscribe(&mut node, 3, Command::SetInputPos, 100);
    assert_eq!(node.axes()[0].config.can.periodic.len(), 2);
    assert!(node.axes()[1].config.can.periodic.is_empty());

    subscribe(&mut node, 3, Command::GetEncoderCount, 0);
    assert_eq!(
        node.axes()[0].config.can.periodic.active(),
        &[PeriodicEntry {
            command_id: 0x01,
            interval_ms: 100,
            last_fire_ms: 0
        }]
    );
}

#[test]
/// The heartbeat carries the axis error and the current state.
fn test_heartbeat_content() {
    let mut node = node();
    node.axes_mut()[0].current_state = AxisState::ClosedLoopControl;
    node.axes_mut()[0].error.insert(AxisError::ESTOP_REQUESTED);
    subscribe(&mut node, 3, Command::Heartbeat, 100);

    let mut frames = Vec::new();
    node.poll_cyclic(100, |frame| {
        frames.push(frame.clone());
        Ok::<(), ()>(())
    });
    assert_eq!(frames.len(), 1);
    assert_eq!(&frames[0].data[..4], &0x4000u32.to_le_bytes());
    assert_eq!(&frames[0].data[4..], &8u32.to_le_bytes());
}
