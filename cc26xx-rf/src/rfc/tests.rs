use super::cmd::{CmdNop, CmdRadioSetup, CMD_BLE_ADV_NC, CMD_NOP, CMD_PING, CMD_RADIO_SETUP, CMD_START_RAT};
use super::*;
use crate::adv::AdvData;
use crate::poll::Bounded;
use crate::sim::Sim;

fn booted() -> Rfc<Sim, Bounded> {
    let mut rfc = Rfc::new(Sim::booted_host(), Bounded::new(1_000), Config::default());
    rfc.boot().unwrap();
    rfc
}

fn awesomeness() -> AdvData {
    let mut adv = AdvData::new();
    adv.flags(0x06).unwrap().tx_power(5).unwrap().complete_name("Awesomeness").unwrap();
    adv
}

fn position(writes: &[(&'static str, u32)], name: &str, value: Option<u32>) -> usize {
    writes
        .iter()
        .position(|(n, v)| *n == name && value.map_or(true, |value| *v == value))
        .unwrap()
}

#[test]
fn boot_follows_power_sequence() {
    let mut rfc = booted();
    let sim = rfc.hardware();
    let writes = &sim.writes;

    let off = position(writes, "PRCM.PDCTL0RFC", Some(0));
    let mode = position(writes, "PRCM.RFCMODESEL", Some(1));
    let on = position(writes, "PRCM.PDCTL0RFC", Some(1));
    let clock = position(writes, "PRCM.RFCCLKG", None);
    let modules = position(writes, "RFC_PWR.PWMCLKEN", Some(0x7FF));
    let doorbell = position(writes, "RFC_DBELL.CMDR", None);

    assert!(off < mode);
    assert!(mode < on);
    assert!(on < clock);
    assert!(clock < modules);
    assert!(modules < doorbell);

    assert!(!sim.mode_written_while_powered);
    assert_eq!(sim.loads, 4);
    assert_eq!(sim.executed, [CMD_RADIO_SETUP, CMD_START_RAT]);
    assert!(sim.rat_running);
}

#[test]
fn radio_setup_with_ble_overrides_is_done_ok() {
    let mut rfc = booted();

    let mut cmd = CmdRadioSetup::new();
    cmd.tx_power = TxPower::DBM_5;
    cmd.reg_override = overrides::BLE_DIFFERENTIAL_INTERNAL_BIAS.as_ptr() as *mut u32;

    assert_eq!(rfc.submit(&mut cmd), Ok(Status::DONE_OK));
    assert_eq!(rfc.hardware().override_words, 19);
}

#[test]
fn radio_setup_failure_is_a_protocol_error() {
    let mut sim = Sim::booted_host();
    sim.force_status = Some(Status::ERROR_PAR);
    let mut rfc = Rfc::new(sim, Bounded::new(1_000), Config::default());

    assert_eq!(
        rfc.boot(),
        Err(Error::Protocol {
            command: CMD_RADIO_SETUP,
            status: Status::ERROR_PAR
        })
    );
    assert!(!rfc.hardware().rat_running);
}

#[test]
fn start_rat_while_running_is_accepted() {
    let mut rfc = booted();

    assert_eq!(rfc.direct(CMD_START_RAT).map(|sta| sta.result()), Ok(CmdSta::CONTEXT_ERROR));
    assert_eq!(rfc.start_rat(), Ok(()));
}

#[test]
fn boot_twice_tolerates_running_timer() {
    let mut rfc = booted();
    rfc.boot().unwrap();
    assert!(rfc.hardware().rat_running);
}

#[test]
fn submit_returns_terminal_status() {
    let mut rfc = booted();
    let mut cmd = CmdNop::new();

    let status = rfc.submit(&mut cmd).unwrap();
    assert!(status.is_terminal());
    assert_eq!(status, Status::DONE_OK);
    assert_eq!(cmd.status(), status);
    assert_eq!(cmd.status().state(), RecordState::Finished);
}

#[test]
fn finished_record_must_be_zeroed_before_reuse() {
    let mut rfc = booted();
    let mut cmd = CmdNop::new();
    rfc.submit(&mut cmd).unwrap();
    let executed = rfc.hardware().executed.len();

    assert_eq!(rfc.submit(&mut cmd), Err(Error::StaleRecord(Status::DONE_OK)));
    assert_eq!(rfc.hardware().executed.len(), executed);

    cmd = CmdNop::zeroed();
    cmd.command_no = CMD_NOP;
    assert_eq!(cmd.status().state(), RecordState::Idle);
    assert_eq!(rfc.submit(&mut cmd), Ok(Status::DONE_OK));
    assert_eq!(rfc.hardware().executed.len(), executed + 1);
}

#[test]
fn transport_rejection_skips_status_polling() {
    let mut rfc = booted();
    rfc.hardware().reject = Some(CmdSta::SCHEDULING_ERROR);
    let polls = rfc.hardware().status_polls;

    let mut cmd = CmdNop::new();
    let res = rfc.submit(&mut cmd);

    assert_eq!(res, Err(Error::Transport(CmdSta(CmdSta::SCHEDULING_ERROR as u32))));
    assert_eq!(rfc.hardware().status_polls, polls);
    assert_eq!(cmd.status(), Status::IDLE);
}

#[test]
fn unknown_record_is_rejected_by_doorbell() {
    let mut rfc = booted();
    let mut cmd = CmdNop::zeroed();

    match rfc.submit(&mut cmd) {
        Err(Error::Transport(sta)) => assert_eq!(sta.result(), CmdSta::UNKNOWN_COMMAND),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn submit_before_boot_times_out_on_ack() {
    let mut rfc = Rfc::new(Sim::booted_host(), Bounded::new(100), Config::default());
    let mut cmd = CmdNop::new();

    assert_eq!(rfc.submit(&mut cmd), Err(Error::Timeout(Wait::DoorbellAck)));
}

#[test]
fn slow_command_times_out_with_bounded_poll() {
    let mut rfc = booted();
    rfc.hardware().polls_to_complete = 10_000;
    *rfc.poll_mut() = Bounded::new(10);

    let mut cmd = CmdNop::new();
    assert_eq!(rfc.submit(&mut cmd), Err(Error::Timeout(Wait::Command(CMD_NOP))));
    assert_eq!(cmd.status(), Status::ACTIVE);
}

#[test]
fn advertisement_reaches_rf_core() {
    let mut rfc = booted();
    let adv = awesomeness();

    let out = rfc.send_advertisement(&adv).unwrap();
    assert_eq!(out.n_tx_adv_ind, 1);

    let sim = rfc.hardware();
    assert_eq!(sim.last_adv, adv.as_bytes());
    assert_eq!(sim.last_channel, 37);
    assert_eq!(sim.executed.last(), Some(&CMD_BLE_ADV_NC));
}

#[test]
fn output_block_is_read_after_completion() {
    let mut rfc = booted();
    rfc.hardware().polls_to_complete = 20;

    let out = rfc.send_advertisement(&awesomeness()).unwrap();
    assert_eq!(out.n_tx_adv_ind, 1);

    rfc.hardware().polls_to_complete = 20;
    let out = rfc.send_test_transmit().unwrap();
    assert_eq!(out.n_tx, 50);
}

#[test]
fn advertisement_accepts_stopped() {
    let mut rfc = booted();
    rfc.hardware().force_status = Some(Status::BLE_DONE_STOPPED);

    assert!(rfc.send_advertisement(&awesomeness()).is_ok());
}

#[test]
fn advertisement_error_status_is_reported() {
    let mut rfc = booted();
    rfc.hardware().force_status = Some(Status::BLE_ERROR_PAR);

    assert_eq!(
        rfc.send_advertisement(&awesomeness()),
        Err(Error::Protocol {
            command: CMD_BLE_ADV_NC,
            status: Status::BLE_ERROR_PAR
        })
    );
}

#[test]
fn advertisement_without_setup_fails() {
    let mut rfc = Rfc::new(Sim::booted_host(), Bounded::new(1_000), Config::default());
    {
        let mut seq = rfc.sequencer();
        seq.bring_up(PowerDomains::RFC).unwrap();
        seq.enable_rf_modules(0x7FF).unwrap();
    }

    match rfc.send_advertisement(&awesomeness()) {
        Err(Error::Protocol { status, .. }) => assert_eq!(status, Status::ERROR_NO_SETUP),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_transmit_uses_configured_packets() {
    let mut rfc = booted();

    let out = rfc.send_test_transmit().unwrap();
    assert_eq!(out.n_tx, 50);
    assert_eq!(rfc.hardware().last_channel, 37);
}

#[test]
fn ping_and_direct_commands() {
    let mut rfc = booted();
    assert_eq!(rfc.ping(), Ok(()));
    assert_eq!(rfc.direct(0x0BAD).map(|sta| sta.result()), Ok(CmdSta::UNKNOWN_DIR_COMMAND));

    rfc.hardware().reject = Some(CmdSta::CONTEXT_ERROR);
    assert_eq!(rfc.ping(), Err(Error::Transport(CmdSta(CmdSta::CONTEXT_ERROR as u32))));
    assert_eq!(rfc.hardware().executed.iter().filter(|&&c| c == CMD_PING).count(), 1);
}

#[test]
fn status_states() {
    assert_eq!(Status::IDLE.state(), RecordState::Idle);
    assert_eq!(Status::PENDING.state(), RecordState::Pending);
    assert_eq!(Status::ACTIVE.state(), RecordState::Active);
    assert_eq!(Status::SKIPPED.state(), RecordState::Finished);
    assert!(!Status::ACTIVE.is_terminal());
    assert!(Status::SKIPPED.is_terminal());
    assert!(Status::BLE_DONE_OK.is_terminal());
}

#[test]
fn cmdsta_classification() {
    assert!(!CmdSta(0x01).is_rejected());
    assert!(!CmdSta(0x0000_0000).is_rejected());
    assert!(CmdSta(0x85).is_rejected());
    assert_eq!(CmdSta(0x1234_5601).result(), CmdSta::DONE);
    assert_eq!(CmdSta(0x1234_5601).return_value(), 0x12_3456);
}

#[test]
fn direct_command_encoding() {
    assert_eq!(direct_command(CMD_START_RAT), 0x0405_0001);
    assert_eq!(direct_command(CMD_PING), 0x0406_0001);
}
