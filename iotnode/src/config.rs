use embedded_time::duration::Milliseconds;
use no_std_net::Ipv4Addr;

use crate::time::Millis;

/// Runtime configuration of an iotnode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
  /// Port for plain CoAP.
  ///
  /// Defaults to 5683:
  /// ```
  /// use iotnode::config::Config;
  ///
  /// assert_eq!(Config::default().port, 5683);
  /// ```
  pub port: u16,
  /// Port for CoAP over DTLS.
  ///
  /// Defaults to 5684:
  /// ```
  /// use iotnode::config::Config;
  ///
  /// assert_eq!(Config::default().dtls_port, 5684);
  /// ```
  pub dtls_port: u16,
  /// Serve over DTLS instead of plain UDP.
  ///
  /// Defaults to `false`.
  pub secure: bool,
  /// Certificate and key for DTLS; only used when [`Config::secure`]
  /// is set.
  ///
  /// Defaults to `None`.
  pub dtls: Option<DtlsOptions>,
  /// How long one poll loop iteration waits for a datagram
  /// before moving on to notifications and engine work.
  ///
  /// Defaults to 10 milliseconds:
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use iotnode::config::Config;
  ///
  /// assert_eq!(Config::default().recv_timeout, Milliseconds(10u64));
  /// ```
  pub recv_timeout: Millis,
  /// "All CoAP Nodes" multicast group to join.
  ///
  /// Defaults to 224.0.1.187:
  /// ```
  /// use iotnode::config::Config;
  /// use no_std_net::Ipv4Addr;
  ///
  /// assert_eq!(Config::default().multicast, Ipv4Addr::new(224, 0, 1, 187));
  /// ```
  pub multicast: Ipv4Addr,
  /// Merge repeated notify requests for the same resource
  /// within one poll iteration.
  ///
  /// Defaults to `true`.
  pub coalesce_notifications: bool,
}

impl Config {
  /// The port to serve on given [`Config::secure`]
  pub fn serve_port(&self) -> u16 {
    if self.secure {
      self.dtls_port
    } else {
      self.port
    }
  }

  /// The DTLS credentials to hand the security session, if serving
  /// securely
  ///
  /// ```
  /// use iotnode::config::{Config, DtlsOptions};
  ///
  /// let creds = DtlsOptions { cert: b"cert",
  ///                           key: b"key" };
  /// let cfg = Config { dtls: Some(creds),
  ///                    ..Config::default() };
  /// assert_eq!(cfg.credentials(), None);
  ///
  /// let cfg = Config { secure: true,
  ///                    ..cfg };
  /// assert_eq!(cfg.credentials(), Some(creds));
  /// ```
  pub fn credentials(&self) -> Option<DtlsOptions> {
    self.dtls.filter(|_| self.secure)
  }
}

impl Default for Config {
  fn default() -> Self {
    Self { port: 5683,
           dtls_port: 5684,
           secure: false,
           dtls: None,
           recv_timeout: Milliseconds(10),
           multicast: Ipv4Addr::new(224, 0, 1, 187),
           coalesce_notifications: true }
  }
}

/// Identity reported by the OIC discovery resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Device {
  /// Device name (`n`)
  pub hostname: &'static str,
  /// Device id (`di`)
  pub device_uuid: &'static str,
  /// Platform id (`pi`)
  pub platform_uuid: &'static str,
  /// Manufacturer name (`mnmn`)
  pub manufacturer_name: &'static str,
  /// Manufacturer URL (`mnml`); omitted when empty
  pub manufacturer_url: &'static str,
  /// Model number (`mnmo`); omitted when empty
  pub model: &'static str,
}

impl Default for Device {
  /// ```
  /// use iotnode::config::Device;
  ///
  /// assert_eq!(Device::default().hostname, "iotnode");
  /// assert!(Device::default().manufacturer_url.is_empty());
  /// ```
  fn default() -> Self {
    Self { hostname: "iotnode",
           device_uuid: "00000000-0000-0000-0000-000000000000",
           platform_uuid: "00000000-0000-0000-0000-000000000000",
           manufacturer_name: "iotnode",
           manufacturer_url: "",
           model: "" }
  }
}

/// Credentials handed to the DTLS session when [`Config::secure`] is set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DtlsOptions {
  /// PEM or DER certificate
  pub cert: &'static [u8],
  /// Private key matching `cert`
  pub key: &'static [u8],
}
