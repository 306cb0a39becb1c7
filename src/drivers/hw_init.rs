//! Raw ESP-IDF peripheral setup for door inputs and light outputs.
//!
//! Configures GPIO inputs (pull-up, any-edge interrupt) and the LEDC timer
//! and channels using raw sys calls.  Unlike a fixed board bring-up, pins
//! here are armed and released at runtime whenever the channel map changes,
//! so every helper works on a single pin.
//!
//! On non-espidf targets each helper is a no-op simulation so the adapter
//! layer above compiles and runs on the host.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::error::HwError;
use crate::pins::{self, PinId};

/// LEDC channels available for light outputs (ESP32-S3 low-speed group).
pub const LEDC_CHANNELS: u32 = 8;

/// Full-scale LEDC duty at the configured timer resolution.
pub const LEDC_DUTY_MAX: u32 = (1 << pins::PWM_RESOLUTION_BITS) - 1;

/// Map a `0..=pwm_max` brightness level onto the LEDC duty range.
pub fn scale_duty(level: u16, pwm_max: u16) -> u32 {
    if pwm_max == 0 {
        return 0;
    }
    let level = u32::from(level.min(pwm_max));
    level * LEDC_DUTY_MAX / u32::from(pwm_max)
}

// ── GPIO ISR service ──────────────────────────────────────────

/// Install the per-pin GPIO ISR service.  Call once before arming inputs.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service is already installed,
    // which is fine.
    let ret = unsafe { gpio_install_isr_service(0) };
    if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
        return Err(HwError::IsrInstallFailed(ret));
    }
    info!("hw_init: GPIO ISR service installed");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn door_gpio_isr(arg: *mut core::ffi::c_void) {
    // The registration argument is the GPIO number, not a pointer.
    crate::events::dispatch_edge(arg.addr() as PinId);
}

// ── Door sensor inputs ────────────────────────────────────────

/// Configure `pin` as a pulled-up input and attach the any-edge ISR.
#[cfg(target_os = "espidf")]
pub fn arm_input(pin: PinId) -> Result<(), HwError> {
    let gpio = i32::from(pin);
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
        ..Default::default()
    };
    // SAFETY: main-task only; the ISR registered below touches nothing but
    // the lock-free edge notifier.
    unsafe {
        let ret = gpio_config(&cfg);
        if ret != ESP_OK as i32 {
            return Err(HwError::GpioConfigFailed(ret));
        }
        let arg = core::ptr::without_provenance_mut(usize::from(pin));
        let ret = gpio_isr_handler_add(gpio, Some(door_gpio_isr), arg);
        if ret != ESP_OK as i32 {
            return Err(HwError::IsrInstallFailed(ret));
        }
        gpio_intr_enable(gpio);
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn arm_input(pin: PinId) -> Result<(), HwError> {
    log::debug!("hw_init(sim): input GPIO {pin} armed");
    Ok(())
}

/// Detach the ISR from `pin`.  Never fails.
#[cfg(target_os = "espidf")]
pub fn release_input(pin: PinId) {
    let gpio = i32::from(pin);
    // SAFETY: removing a handler that was never added returns an error
    // code, which is ignored.
    unsafe {
        gpio_intr_disable(gpio);
        gpio_isr_handler_remove(gpio);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn release_input(pin: PinId) {
    log::debug!("hw_init(sim): input GPIO {pin} released");
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: PinId) -> bool {
    // SAFETY: register read on a configured input.
    (unsafe { gpio_get_level(i32::from(pin)) }) != 0
}

// ── LEDC PWM ─────────────────────────────────────────────────

/// Configure the shared light timer (`PWM_FREQ_HZ`, 14-bit).
#[cfg(target_os = "espidf")]
pub fn init_ledc_timer() -> Result<(), HwError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_14_BIT,
        freq_hz: pins::PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: single main-task call during bring-up.
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwError::LedcInitFailed(ret));
    }
    info!("hw_init: LEDC timer 0 at {} Hz", pins::PWM_FREQ_HZ);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_ledc_timer() -> Result<(), HwError> {
    log::info!("hw_init(sim): LEDC timer skipped");
    Ok(())
}

/// Bind LEDC `channel` to `pin`, starting dark.
#[cfg(target_os = "espidf")]
pub fn ledc_attach(channel: u32, pin: PinId) -> Result<(), HwError> {
    let cfg = ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        gpio_num: i32::from(pin),
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    // SAFETY: main-task only; the channel is not bound to any other pin.
    let ret = unsafe { ledc_channel_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwError::LedcInitFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_attach(channel: u32, pin: PinId) -> Result<(), HwError> {
    log::debug!("hw_init(sim): LEDC CH{channel} -> GPIO {pin}");
    Ok(())
}

/// Stop LEDC `channel` low and return `pin` to its reset state.
#[cfg(target_os = "espidf")]
pub fn ledc_detach(channel: u32, pin: PinId) {
    // SAFETY: main-task only; errors on an unconfigured channel are ignored.
    unsafe {
        ledc_stop(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, 0);
        gpio_reset_pin(i32::from(pin));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_detach(channel: u32, pin: PinId) {
    log::debug!("hw_init(sim): LEDC CH{channel} released from GPIO {pin}");
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u32) {
    // SAFETY: duty register writes happen from the main loop only.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u32) {}
