use no_std_net::Ipv4Addr;
use serde_json::json;
use std_alloc::format;
use toad_array::Array;

use crate::adapter::Adapter;
use crate::code;
use crate::engine::Engine;
use crate::msg::{Message, MessageRead};
use crate::opt::ContentFormat;
use crate::payload;
use crate::resource::{ApplicationResource, Outcome, Registration, ResourceId};
use crate::Error;

/// Addressing of the station interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpInfo {
  #[allow(missing_docs)]
  pub ip: Ipv4Addr,
  #[allow(missing_docs)]
  pub netmask: Ipv4Addr,
  #[allow(missing_docs)]
  pub gateway: Ipv4Addr,
}

/// Source of the station's addressing
pub trait NetInfo {
  /// `None` while the interface has no address information
  fn ip_info(&self) -> Option<IpInfo>;
}

/// # Wi-Fi status
/// Reports the station's address, netmask and gateway.
///
/// Plain text unless JSON or CBOR is accepted.
#[derive(Debug)]
pub struct Wifi<N>(pub N);

impl<N: NetInfo> Wifi<N> {
  /// Register at `wifi`, answering GET
  pub fn install<'r, E, A>(&'r self, adapter: &mut Adapter<E, A>) -> Result<ResourceId, Error>
    where E: Engine,
          A: Array<Item = Registration<'r, E::Resource>>
  {
    let id = adapter.create_resource(self, "wifi")?;
    adapter.resource(id)?.register_method(code::GET)?;
    Ok(id)
  }

  fn respond(&self, req: &dyn MessageRead, rep: &mut dyn Message) -> Result<(), Error> {
    let info = match self.0.ip_info() {
      | Some(info) => info,
      | None => {
        log::error!("failed to get ip address information");
        rep.set_code(code::INTERNAL_SERVER_ERROR);
        return rep.set_payload(b"failed to get ip address information");
      },
    };

    let supported = [ContentFormat::Text, ContentFormat::Json, ContentFormat::Cbor];
    match payload::negotiate(req, ContentFormat::Text, &supported) {
      | Ok(ContentFormat::Text) => {
        let text = format!("IP: {}, Mask: {}, Gateway: {}",
                           info.ip, info.netmask, info.gateway);
        payload::reply(rep, ContentFormat::Text, text.as_bytes())
      },
      | Ok(format) => {
        let doc = json!({
          "ip": format!("{}", info.ip),
          "mask": format!("{}", info.netmask),
          "gateway": format!("{}", info.gateway),
        });
        payload::reply(rep, format, &payload::encode(&doc, format)?)
      },
      | Err(_) => {
        rep.set_code(code::BAD_OPTION);
        Err(Error::Codec)
      },
    }
  }
}

impl<N: NetInfo> ApplicationResource for Wifi<N> {
  fn handle_request(&self, req: &dyn MessageRead, rep: &mut dyn Message) -> Outcome {
    match self.respond(req, rep) {
      | Ok(()) => Outcome::Ok,
      | Err(_) => Outcome::Error,
    }
  }
}
