#![no_std]
#![no_main]

use cc26xx_rf::adv::{flags, AdvData, AdvError};
use cc26xx_rf::delay::BlockingDelay;
use cc26xx_rf::hw::Mmio;
use cc26xx_rf::osc::{ClockSource, ClockTree};
use cc26xx_rf::poll::Spin;
use cc26xx_rf::prcm::{PowerDomains, Sequencer};
use cc26xx_rf::rfc::{Config, Rfc};
use cc26xx_rf::Error;
use cortex_m_rt::entry;
use defmt::*;
use embedded_hal::delay::DelayNs;
use {defmt_rtt as _, panic_probe as _};

mod ccfg;

const HOST_DOMAINS: PowerDomains = PowerDomains::VIMS
    .union(PowerDomains::SYSBUS)
    .union(PowerDomains::CPU)
    .union(PowerDomains::SERIAL)
    .union(PowerDomains::PERIPH);

const ADV_INTERVAL_MS: u32 = 100;

#[entry]
fn main() -> ! {
    info!("Hello World!");

    let p = cc26xx_rf::init();
    let mut hw = Mmio::new(p.PRCM, p.DDI0_OSC, p.RFC_PWR, p.RFC_DBELL);

    if let Err(e) = mcu_boot(&mut hw) {
        halt("MCU boot", e);
    }
    info!("Host domains up, running from XOSC_HF");

    let mut rfc = Rfc::new(hw, Spin, Config::default());
    if let Err(e) = rfc.boot() {
        halt("RF core boot", e);
    }
    info!("RF core ready");

    let adv = match payload() {
        Ok(adv) => adv,
        Err(e) => halt("payload", e.into()),
    };
    info!("Advertising {}", adv);

    let mut delay = BlockingDelay::default();
    loop {
        #[cfg(not(feature = "tx-test"))]
        match rfc.send_advertisement(&adv) {
            Ok(out) => debug!("ADV_IND sent, total {}", out.n_tx_adv_ind),
            Err(e) => halt("advertise", e),
        }

        #[cfg(feature = "tx-test")]
        match rfc.send_test_transmit() {
            Ok(out) => debug!("Test packets sent: {}", out.n_tx),
            Err(e) => halt("tx test", e),
        }

        delay.delay_ms(ADV_INTERVAL_MS);
    }
}

/// Power the host domains and move both clock trees to the crystals.
fn mcu_boot(hw: &mut Mmio<'_>) -> Result<(), Error> {
    let mut poll = Spin;
    let mut seq = Sequencer::new(hw, &mut poll);

    seq.bring_up(HOST_DOMAINS)?;
    seq.select_clock_source(ClockTree::Hf, ClockSource::XoscHf)?;
    seq.select_clock_source(ClockTree::Lf, ClockSource::XoscLf)?;
    seq.commit_load()
}

fn payload() -> Result<AdvData, AdvError> {
    let mut adv = AdvData::new();
    adv.flags(flags::LE_GENERAL_DISCOVERABLE | flags::BR_EDR_NOT_SUPPORTED)?
        .tx_power(5)?
        .complete_name("Awesomeness")?;
    Ok(adv)
}

fn halt(stage: &str, e: Error) -> ! {
    error!("{} failed: {:?}", stage, e);
    loop {
        cortex_m::asm::wfi();
    }
}
