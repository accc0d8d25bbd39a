//! # Node walkthrough
//!
//! Synchronous tour of axis-can, without any bus:
//! - Build a node hosting two axes
//! - Route a position setpoint and a bus voltage query
//! - Subscribe to periodic telemetry and run a few scans
//!
//! ```bash
//! cargo run --example node_walkthrough
//! ```

use axis_can::infra::codec::traits::{FromPayload, ToPayload};
use axis_can::protocol::axis::{Axis, AxisEvents, CanConfig};
use axis_can::protocol::commands::Command;
use axis_can::protocol::messages::{SetInputPos, SetPeriodicUpdate, VbusVoltage};
use axis_can::protocol::node::{Dispatch, Node};
use axis_can::protocol::transport::can_frame::CanFrame;
use axis_can::protocol::transport::can_id::CanId;

/// Prints every hook the dispatcher fires.
struct PrintHooks(&'static str);

impl AxisEvents for PrintHooks {
    fn input_pos_updated(&mut self) {
        println!("   [{}] input_pos_updated", self.0);
    }
}

fn main() {
    println!("=== axis-can walkthrough ===\n");

    // ======================================================================
    // 1. Node with two axes on node ids 0 and 1
    // ======================================================================
    println!("1. Building the node");

    let mut node = Node::new([
        Axis::new(CanConfig::new(0), PrintHooks("axis0")),
        Axis::new(CanConfig::new(1), PrintHooks("axis1")),
    ])
    .expect("command table is valid");
    node.vbus_voltage = 24.3;
    println!("   Hosting node ids 0 and 1\n");

    // ======================================================================
    // 2. Position setpoint for axis 1
    // ======================================================================
    println!("2. Sending a position setpoint to node 1");

    let setpoint = SetInputPos {
        input_pos: 3.25,
        vel_ff: 1.5,
        torque_ff: -0.1,
    };
    let payload = setpoint.to_payload().expect("setpoint fits its layout");
    print!("   Payload: ");
    for byte in &payload {
        print!("{:02X} ", byte);
    }
    println!();

    let frame = CanFrame::new(CanId::new(1, Command::SetInputPos.id()), false, &payload);
    println!("   CAN ID: 0x{:03X}", frame.id.raw());
    match node.route(&frame) {
        Ok(dispatch) => println!("   Dispatch: {:?}", dispatch),
        Err(e) => eprintln!("   Codec error: {:?}", e),
    }
    let controller = &node.axes()[1].controller;
    println!(
        "   input_pos={} input_vel={} input_torque={}\n",
        controller.input_pos, controller.input_vel, controller.input_torque
    );

    // ======================================================================
    // 3. Remote request for the bus voltage
    // ======================================================================
    println!("3. Querying the bus voltage of node 0");

    let query = CanFrame::remote(CanId::new(0, Command::GetVbusVoltage.id()), false);
    if let Ok(Dispatch::Respond(response)) = node.route(&query) {
        let voltage = VbusVoltage::from_payload(&response.data).expect("valid response");
        println!(
            "   Response 0x{:03X}: {:.1} V\n",
            response.id.raw(),
            voltage.vbus_voltage
        );
    }

    // ======================================================================
    // 4. Periodic heartbeat every 100 ms on node 0
    // ======================================================================
    println!("4. Subscribing node 0 to a 100 ms heartbeat");

    let request = SetPeriodicUpdate {
        command_id: Command::Heartbeat.id() as u32,
        interval_ms: 100,
    };
    let frame = CanFrame::new(
        CanId::new(0, Command::SetPeriodicUpdate.id()),
        false,
        &request.to_payload().expect("request fits its layout"),
    );
    let _ = node.route(&frame);

    for now_ms in (0..=400).step_by(50) {
        let sent = node.poll_cyclic(now_ms, |frame| {
            println!("   t={:>3} ms -> 0x{:03X}", now_ms, frame.id.raw());
            Ok::<(), ()>(())
        });
        if sent == 0 {
            println!("   t={:>3} ms    (nothing due)", now_ms);
        }
    }

    println!("\n=== done ===");
}
