use std_alloc::vec::Vec;
use toad_array::Array;

use crate::adapter::Adapter;
use crate::code;
use crate::config::Device;
use crate::engine::Engine;
use crate::msg::{Message, MessageRead};
use crate::opt::ContentFormat;
use crate::payload::{self, cbor};
use crate::resource::{ApplicationResource, Outcome, Registration, ResourceId};
use crate::Error;

/// OCF core spec version reported by `oic/d`
pub const CORE_VERSION: &str = "core.1.1.0";

/// OCF resource spec version reported by `oic/d`
pub const DATA_MODEL_VERSION: &str = "res.1.1.0";

/// Which discovery document a [`Document`] serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
  /// `oic/res`
  Res,
  /// `oic/p`
  Platform,
  /// `oic/d`
  Device,
}

impl Kind {
  /// Path the document is registered at
  pub fn uri(&self) -> &'static str {
    match self {
      | Kind::Res => "oic/res",
      | Kind::Platform => "oic/p",
      | Kind::Device => "oic/d",
    }
  }
}

/// One of the mandatory OIC discovery resources; always CBOR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document {
  kind: Kind,
  device: Device,
}

impl Document {
  /// The document's CBOR map, keys in the order they are written
  pub fn body(&self) -> cbor::Value {
    let dev = &self.device;

    match self.kind {
      | Kind::Res => cbor::Value::map([("n", cbor::Value::from(dev.hostname)),
                                       ("di", cbor::Value::from(dev.device_uuid)),
                                       ("links", cbor::Value::Array(Vec::new()))]),
      | Kind::Platform => {
        let required = [("pi", dev.platform_uuid), ("mnmn", dev.manufacturer_name)];
        let optional = [("mnml", dev.manufacturer_url), ("mnmo", dev.model)];

        cbor::Value::map(required.into_iter()
                                 .chain(optional.into_iter().filter(|(_, v)| !v.is_empty()))
                                 .map(|(k, v)| (k, cbor::Value::from(v))))
      },
      | Kind::Device => cbor::Value::map([("n", cbor::Value::from(dev.hostname)),
                                          ("di", cbor::Value::from(dev.device_uuid)),
                                          ("icv", cbor::Value::from(CORE_VERSION)),
                                          ("dmv", cbor::Value::from(DATA_MODEL_VERSION))]),
    }
  }
}

impl ApplicationResource for Document {
  fn handle_request(&self, req: &dyn MessageRead, rep: &mut dyn Message) -> Outcome {
    if req.code() != code::GET.0 {
      rep.set_code(code::METHOD_NOT_ALLOWED);
      return Outcome::Ok;
    }

    match payload::reply(rep, ContentFormat::Cbor, &self.body().to_vec()) {
      | Ok(()) => Outcome::Ok,
      | Err(_) => Outcome::Error,
    }
  }
}

/// # OIC discovery
/// `oic/res`, `oic/p` and `oic/d`, describing a [`Device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discovery {
  docs: [Document; 3],
}

impl Discovery {
  /// Discovery documents for `device`
  pub fn new(device: Device) -> Self {
    let doc = |kind| Document { kind, device };
    Self { docs: [doc(Kind::Res), doc(Kind::Platform), doc(Kind::Device)] }
  }

  /// The document of one kind
  pub fn document(&self, kind: Kind) -> &Document {
    match kind {
      | Kind::Res => &self.docs[0],
      | Kind::Platform => &self.docs[1],
      | Kind::Device => &self.docs[2],
    }
  }

  /// Register all three documents, answering GET.
  ///
  /// Yields their ids in the order res, p, d.
  pub fn install<'r, E, A>(&'r self,
                           adapter: &mut Adapter<E, A>)
                           -> Result<[ResourceId; 3], Error>
    where E: Engine,
          A: Array<Item = Registration<'r, E::Resource>>
  {
    let mut ids = [ResourceId(0); 3];

    for (doc, id) in self.docs.iter().zip(ids.iter_mut()) {
      *id = adapter.create_resource(doc, doc.kind.uri())?;
      adapter.resource(*id)?.register_method(code::GET)?;
    }

    Ok(ids)
  }
}
