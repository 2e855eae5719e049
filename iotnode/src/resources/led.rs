use core::cell::Cell;

use serde_json::json;
use toad_array::Array;

use crate::adapter::Adapter;
use crate::code::{self, Code};
use crate::engine::Engine;
use crate::msg::{Message, MessageRead};
use crate::opt::{known, ContentFormat};
use crate::payload;
use crate::resource::{ApplicationResource, Outcome, Registration, ResourceId};
use crate::Error;

/// Milliseconds every color change fades over
pub const FADE_MS: u32 = 200;

/// One color channel of the LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
  #[allow(missing_docs)]
  Red,
  #[allow(missing_docs)]
  Green,
  #[allow(missing_docs)]
  Blue,
}

const CHANNELS: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

/// PWM driver behind the LED. Duties are 10 bit.
pub trait Pwm {
  /// Fade `channel` to `duty` over `millis`, without waiting
  fn fade(&self, channel: Channel, duty: u16, millis: u32);
}

/// Who controls the LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
  /// The firmware shows its status; user colors are stored but not shown
  Status,
  /// The user's color is shown
  User,
}

impl Mode {
  fn as_str(&self) -> &'static str {
    match self {
      | Mode::Status => "status",
      | Mode::User => "user",
    }
  }
}

/// # RGB LED
/// Answers GET with `{"color":[r,g,b],"mode":"status"|"user"}` and
/// takes the same document (either key optional) by POST.
#[derive(Debug)]
pub struct Led<P> {
  pwm: P,
  duties: Cell<[u16; 3]>,
  mode: Cell<Mode>,
}

impl<P: Pwm> Led<P> {
  /// A dark LED in [`Mode::Status`]
  pub fn new(pwm: P) -> Self {
    Self { pwm,
           duties: Cell::new([0; 3]),
           mode: Cell::new(Mode::Status) }
  }

  /// Register at `led`, answering GET and POST
  pub fn install<'r, E, A>(&'r self, adapter: &mut Adapter<E, A>) -> Result<ResourceId, Error>
    where E: Engine,
          A: Array<Item = Registration<'r, E::Resource>>
  {
    let id = adapter.create_resource(self, "led")?;
    adapter.resource(id)?
           .register_method(code::GET)?
           .register_method(code::POST)?;
    Ok(id)
  }

  /// The current mode
  pub fn mode(&self) -> Mode {
    self.mode.get()
  }

  /// Switch mode, fading to black (status) or to the stored color (user)
  pub fn set_mode(&self, mode: Mode) {
    if self.mode.replace(mode) == mode {
      return;
    }

    match mode {
      | Mode::Status => self.fade_to([0; 3], FADE_MS),
      | Mode::User => self.fade_to(self.duties.get(), FADE_MS),
    }
  }

  /// Store the user color; it is only shown in [`Mode::User`]
  pub fn set_color(&self, [r, g, b]: [u8; 3]) {
    let duties = [u16::from(r) << 2, u16::from(g) << 2, u16::from(b) << 2];
    self.duties.set(duties);

    if self.mode() == Mode::User {
      self.fade_to(duties, FADE_MS);
    }
  }

  /// The stored user color
  pub fn color(&self) -> [u8; 3] {
    self.duties.get().map(|d| (d >> 2) as u8)
  }

  /// Show a status color; ignored unless in [`Mode::Status`]
  pub fn set_status_color(&self, [r, g, b]: [u8; 3], fade_ms: u32) {
    if self.mode() == Mode::Status {
      self.fade_to([u16::from(r) << 2, u16::from(g) << 2, u16::from(b) << 2],
                   fade_ms);
    }
  }

  fn fade_to(&self, duties: [u16; 3], millis: u32) {
    CHANNELS.iter()
            .zip(duties)
            .for_each(|(ch, duty)| self.pwm.fade(*ch, duty, millis));
  }

  fn apply(&self, doc: &serde_json::Value) -> Result<(), Error> {
    if let Some(color) = doc.get("color") {
      let rgb = color.as_array()
                     .filter(|c| c.len() == 3)
                     .and_then(|c| {
                       let channel = |ix: usize| c[ix].as_u64().and_then(|n| u8::try_from(n).ok());
                       Some([channel(0)?, channel(1)?, channel(2)?])
                     })
                     .ok_or(Error::Codec)?;
      self.set_color(rgb);
    }

    match doc.get("mode").and_then(|m| m.as_str()) {
      | Some("status") => self.set_mode(Mode::Status),
      | Some("user") => self.set_mode(Mode::User),
      | _ => (),
    }

    Ok(())
  }

  fn reject(rep: &mut dyn Message, code: Code) -> Outcome {
    rep.set_code(code);
    Outcome::Error
  }

  fn post(&self, req: &dyn MessageRead, rep: &mut dyn Message) -> Result<(), Outcome> {
    match req.content_format_option(known::CONTENT_FORMAT) {
      | Ok(None) | Ok(Some(ContentFormat::Json)) => (),
      | Ok(Some(_)) => return Err(Self::reject(rep, code::UNSUPPORTED_CONTENT_FORMAT)),
      | Err(_) => return Err(Self::reject(rep, code::BAD_OPTION)),
    }

    let body = req.payload().map_err(|_| Self::reject(rep, code::BAD_REQUEST))?;
    payload::decode_json(body).and_then(|doc| self.apply(&doc))
                              .map_err(|_| Self::reject(rep, code::BAD_REQUEST))
  }
}

impl<P: Pwm> ApplicationResource for Led<P> {
  fn handle_request(&self, req: &dyn MessageRead, rep: &mut dyn Message) -> Outcome {
    let posted = req.code() == code::POST.0;

    if posted {
      if let Err(outcome) = self.post(req, rep) {
        return outcome;
      }
    }

    let doc = json!({
      "color": self.color(),
      "mode": self.mode().as_str(),
    });

    match payload::reply_doc(req, rep, &doc) {
      | Ok(()) if posted => {
        rep.set_code(code::CHANGED);
        Outcome::Ok
      },
      | Ok(()) => Outcome::Ok,
      | Err(_) => Outcome::Error,
    }
  }
}
