/// RGB LED
pub mod led;

/// push switch & its debouncer
pub mod switch;

/// station address info
pub mod wifi;

/// OIC discovery documents
pub mod oic;

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::led::{Led, Mode};
  use super::oic::Discovery;
  use super::switch::{Debouncer, Gpio, State, Switch};
  use crate::adapter::Adapter;
  use crate::code;
  use crate::config::{Config, Device};
  use crate::observe::NotifyQueue;
  use crate::opt::ContentFormat;
  use crate::poll::PollLoop;
  use crate::resource::Registration;
  use crate::test::{self, ClockMock, EngineMock, PwmMock, SockMock, WireMsg};

  type Loop<'q, 'r> =
    PollLoop<'q, EngineMock, Vec<Registration<'r, usize>>, SockMock, ClockMock, 8>;

  fn serve<'q, 'r>(queue: &'q NotifyQueue<8>, adapter: Adapter<EngineMock, Vec<Registration<'r, usize>>>) -> Loop<'q, 'r> {
    let mut lp = PollLoop::new(adapter,
                               SockMock::new(),
                               ClockMock::new(),
                               queue,
                               Config::default());
    lp.adapter().set_network_ready(true);
    lp
  }

  fn exchange(lp: &mut Loop, msg: WireMsg) -> WireMsg {
    lp.socket().push_rx(msg, test::dummy_addr());
    lp.poll_once();

    let mut sent = lp.socket().take_tx();
    assert_eq!(sent.len(), 1);
    sent.remove(0).0
  }

  #[test]
  fn led_post_then_get() {
    simple_logger::init_with_level(log::Level::Trace).ok();

    let led = Led::new(PwmMock::default());
    let queue = NotifyQueue::new();
    let mut adapter = Adapter::new(EngineMock::default());
    adapter.start().unwrap();
    led.install(&mut adapter).unwrap();
    let mut lp = serve(&queue, adapter);

    let rep = exchange(&mut lp,
                       WireMsg::post("led", br#"{"color":[1,2,3],"mode":"user"}"#));
    assert_eq!(rep.code, u8::from(code::CHANGED));
    assert_eq!(led.mode(), Mode::User);

    let rep = exchange(&mut lp, WireMsg::get("led"));
    assert_eq!(rep.code, u8::from(code::CONTENT));
    assert_eq!(serde_json::from_slice::<serde_json::Value>(&rep.payload.unwrap()).unwrap(),
               json!({"color": [1, 2, 3], "mode": "user"}));

    let rep = exchange(&mut lp, WireMsg::get("led").accept(ContentFormat::Json));
    assert_eq!(rep.code, 0x45);
    assert_eq!(rep.opts, vec![(12, vec![50])]);
    assert_eq!(rep.payload.as_deref(),
               Some(&br#"{"color":[1,2,3],"mode":"user"}"#[..]));

    let put = WireMsg { code: u8::from(code::PUT.0),
                        ..WireMsg::get("led") };
    assert_eq!(exchange(&mut lp, put).code, u8::from(code::METHOD_NOT_ALLOWED));
  }

  #[test]
  fn led_get_accepting_json() {
    let led = Led::new(PwmMock::default());
    let queue = NotifyQueue::new();
    let mut adapter = Adapter::new(EngineMock::default());
    adapter.start().unwrap();
    led.install(&mut adapter).unwrap();
    let mut lp = serve(&queue, adapter);

    let rep = exchange(&mut lp, WireMsg::get("led").accept(ContentFormat::Json));
    assert_eq!(rep.code, 0x45);
    assert_eq!(rep.opts, vec![(12, vec![50])]);
    assert_eq!(rep.payload.as_deref(),
               Some(&br#"{"color":[0,0,0],"mode":"status"}"#[..]));
  }

  #[test]
  fn switch_notifies_observers() {
    struct High;
    impl Gpio for High {
      fn level(&self) -> u32 {
        1
      }
    }

    let switch = Switch::new();
    let queue = NotifyQueue::new();
    let mut adapter = Adapter::new(EngineMock::default());
    adapter.start().unwrap();
    let id = switch.install(&mut adapter).unwrap();
    let mut lp = serve(&queue, adapter);

    let rep = exchange(&mut lp, WireMsg::observe("switch").accept(ContentFormat::Cbor));
    assert!(rep.observe);
    assert_eq!(rep.payload.unwrap()[0], 0xA1);

    let deb = Debouncer::new(High, 1, &switch, queue.notifier(), id);
    assert!(deb.on_edge());
    assert_eq!(switch.state(), State::Pushed);

    lp.poll_once();
    let sent = lp.socket().take_tx();
    assert_eq!(sent.len(), 1);

    let note = sent[0].data();
    assert!(note.observe);
    assert_eq!(note.code, u8::from(code::CONTENT));
    assert_eq!(note.opts, vec![(12, vec![60])]);
    assert!(note.payload.as_ref().unwrap().ends_with(b"\x66pushed"));

    let rep = exchange(&mut lp, WireMsg::get("switch").accept(ContentFormat::Cbor));
    assert_eq!(rep.code, note.code);
    assert_eq!(rep.opts, note.opts);
    assert_eq!(rep.payload, note.payload);
  }

  #[test]
  fn discovery_is_cbor() {
    let oic = Discovery::new(Device::default());
    let queue = NotifyQueue::new();
    let mut adapter = Adapter::new(EngineMock::default());
    adapter.start().unwrap();
    let ids = oic.install(&mut adapter).unwrap();
    assert_eq!(ids.map(|id| id.0), [0, 1, 2]);
    let mut lp = serve(&queue, adapter);

    for uri in ["oic/res", "oic/p", "oic/d"] {
      let rep = exchange(&mut lp, WireMsg::get(uri));
      assert_eq!(rep.code, u8::from(code::CONTENT), "{}", uri);
      assert_eq!(rep.opts, vec![(12, vec![60])]);
    }

    let rep = exchange(&mut lp, WireMsg::get("oic/con"));
    assert_eq!(rep.code, u8::from(code::NOT_FOUND));
  }
}
