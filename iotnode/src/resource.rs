use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use toad_array::Array;
use toad_len::Len;

use crate::code::{self, Code, Method};
use crate::engine::{Engine, Handler, HandlerResult};
use crate::logging;
use crate::msg::{Message, MessageRead, ObservedGet, Observer, ObserverRef, Request, Response};
use crate::Error;

/// Longest URI a registration can hold
pub const MAX_URI_LEN: usize = 64;

/// What an [`ApplicationResource`] made of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
  /// The response is complete
  Ok,
  /// Something went wrong; the response code says what
  Error,
  /// The response will be sent separately
  Postpone,
}

impl From<Outcome> for HandlerResult {
  fn from(o: Outcome) -> Self {
    match o {
      | Outcome::Ok => HandlerResult::Ok,
      | Outcome::Postpone => HandlerResult::Postpone,
      | Outcome::Error => HandlerResult::Error,
    }
  }
}

/// # Application resource
/// A handler exposed at a URI.
///
/// Resources never see the engine's message types; they are handed
/// a read-only [`MessageRead`] for the request and a [`Message`] for
/// the response, both borrowed for the duration of the call.
///
/// Handlers run on the poll loop's thread and must not block.
pub trait ApplicationResource {
  /// Answer a request
  fn handle_request(&self, req: &dyn MessageRead, rep: &mut dyn Message) -> Outcome;

  /// Build a notification for `observer`.
  ///
  /// Defaults to answering as if the observer had sent a GET carrying
  /// the options of its registering request.
  fn handle_notify(&self, observer: &dyn Observer, rep: &mut dyn Message) -> Outcome {
    self.handle_request(&ObservedGet(observer), rep)
  }
}

/// Set of request methods a resource answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Methods(u8);

impl Methods {
  /// No methods
  pub const NONE: Self = Self(0);
  /// GET
  pub const GET: Self = Self(1);
  /// POST
  pub const POST: Self = Self(1 << 1);
  /// PUT
  pub const PUT: Self = Self(1 << 2);
  /// DELETE
  pub const DELETE: Self = Self(1 << 3);
  /// GET, POST, PUT & DELETE
  pub const ALL: Self = Self(0b1111);

  /// The bit for `method`
  ///
  /// ```
  /// use iotnode::code;
  /// use iotnode::resource::Methods;
  ///
  /// assert_eq!(Methods::of(code::PUT), Some(Methods::PUT));
  /// assert_eq!(Methods::of(code::Method(code::CONTENT)), None);
  /// ```
  pub fn of(method: Method) -> Option<Self> {
    match method {
      | code::GET => Some(Self::GET),
      | code::POST => Some(Self::POST),
      | code::PUT => Some(Self::PUT),
      | code::DELETE => Some(Self::DELETE),
      | _ => None,
    }
  }

  /// Does this set let `code` through?
  pub fn allows(&self, code: Code) -> bool {
    Method::try_from_code(code).and_then(Self::of)
                               .map(|m| self.0 & m.0 != 0)
                               .unwrap_or(false)
  }

  /// Raw bitmask
  pub fn bits(&self) -> u8 {
    self.0
  }
}

impl BitOr for Methods {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self {
    Self(self.0 | rhs.0)
  }
}

impl BitOrAssign for Methods {
  fn bitor_assign(&mut self, rhs: Self) {
    self.0 |= rhs.0;
  }
}

/// Index of a registration in a [`Registry`]
///
/// Stable while the registration is live; entries are never reordered.
/// Once removed, the index may be given to a later registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ResourceId(pub usize);

impl fmt::Display for ResourceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// An application resource bound to a native resource handle `H`
pub struct Registration<'r, H> {
  /// Engine handle; `None` once deregistered
  pub native: Option<H>,
  /// The handler; `None` once deregistered
  pub app: Option<&'r dyn ApplicationResource>,
  /// Where the resource lives
  pub uri: toad_string::String<MAX_URI_LEN>,
  /// Methods the resource answers
  pub methods: Methods,
  /// Whether the resource accepts Observe registrations
  pub observable: bool,
}

impl<'r, H> Registration<'r, H> {
  /// A fresh registration answering no methods
  pub fn new(native: H, app: &'r dyn ApplicationResource, uri: &str) -> Result<Self, Error> {
    if uri.len() > MAX_URI_LEN {
      return Err(Error::CreateResource);
    }

    Ok(Self { native: Some(native),
              app: Some(app),
              uri: toad_string::String::from(uri),
              methods: Methods::NONE,
              observable: false })
  }

  /// Has this registration been removed?
  pub fn is_vacant(&self) -> bool {
    self.native.is_none()
  }
}

impl<'r, H> Default for Registration<'r, H> {
  fn default() -> Self {
    Self { native: None,
           app: None,
           uri: Default::default(),
           methods: Methods::NONE,
           observable: false }
  }
}

impl<'r, H: fmt::Debug> fmt::Debug for Registration<'r, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Registration")
     .field("native", &self.native)
     .field("app", &self.app.map(|_| ".."))
     .field("uri", &self.uri.as_str())
     .field("methods", &self.methods)
     .field("observable", &self.observable)
     .finish()
  }
}

/// # Resource registry
/// Table of [`Registration`]s, stored in any [`Array`]
/// (a `Vec` or a fixed-capacity `tinyvec::ArrayVec`).
///
/// Also the [`Handler`] the engine calls back into: it finds the
/// registration for the engine's resource handle, adapts the
/// native messages and invokes the application resource.
#[derive(Debug, Default)]
pub struct Registry<A>(A);

impl<'r, H, A> Registry<A>
  where H: Copy + PartialEq,
        A: Array<Item = Registration<'r, H>>
{
  /// An empty registry
  pub fn new() -> Self {
    Self(A::default())
  }

  /// Store a registration in the first vacant slot, appending
  /// when there is none
  pub fn push(&mut self, reg: Registration<'r, H>) -> Result<ResourceId, Error> {
    match self.0.iter().position(Registration::is_vacant) {
      | Some(ix) => {
        self.0[ix] = reg;
        Ok(ResourceId(ix))
      },
      | None if Len::is_full(&self.0) => Err(Error::RegistryFull),
      | None => {
        let id = ResourceId(self.0.len());
        self.0.push(reg);
        Ok(id)
      },
    }
  }

  /// Is every slot taken by a live registration?
  pub fn is_full(&self) -> bool {
    Len::is_full(&self.0) && !self.0.iter().any(Registration::is_vacant)
  }

  /// The live registration at `id`
  pub fn get(&self, id: ResourceId) -> Option<&Registration<'r, H>> {
    self.0.get(id.0).filter(|r| !r.is_vacant())
  }

  /// The live registration at `id`
  pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut Registration<'r, H>> {
    self.0.get_mut(id.0).filter(|r| !r.is_vacant())
  }

  /// Find the registration bound to a native handle
  pub fn find<'a>(&'a self, native: H) -> Option<(ResourceId, &'a Registration<'r, H>)>
    where 'r: 'a,
          A: 'a,
          H: 'a
  {
    self.iter().find(|(_, r)| r.native == Some(native))
  }

  /// Vacate the registration at `id`, yielding its native handle.
  ///
  /// The slot keeps its index so other ids stay valid, and is
  /// handed out again by the next [`push`](Registry::push).
  pub fn vacate(&mut self, id: ResourceId) -> Option<H> {
    let reg = self.get_mut(id)?;
    let native = reg.native.take();
    *reg = Registration::default();
    native
  }

  /// Live registrations and their ids
  pub fn iter<'a>(&'a self) -> impl Iterator<Item = (ResourceId, &'a Registration<'r, H>)> + 'a
    where 'r: 'a,
          A: 'a,
          H: 'a
  {
    self.0
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_vacant())
        .map(|(ix, r)| (ResourceId(ix), r))
  }

  fn resolve<'a>(&'a self, native: H) -> Option<(&'a str, &'r dyn ApplicationResource, Methods)>
    where 'r: 'a,
          A: 'a,
          H: 'a
  {
    self.find(native)
        .and_then(|(_, r)| r.app.map(|app| (r.uri.as_str(), app, r.methods)))
  }
}

fn finish(rep: &mut dyn Message, outcome: Outcome) -> HandlerResult {
  if rep.code() == Code::EMPTY && outcome != Outcome::Postpone {
    log::warn!("handler did not set a response code");
    rep.set_code(code::INTERNAL_SERVER_ERROR);
  }

  outcome.into()
}

impl<'r, E, A> Handler<E> for Registry<A>
  where E: Engine,
        A: Array<Item = Registration<'r, E::Resource>>
{
  fn on_request(&self,
                resource: E::Resource,
                request: &E::Message,
                response: &mut E::Message)
                -> HandlerResult {
    let req = Request::new(request);
    let mut rep = Response::new(response);

    let (uri, app, methods) = match self.resolve(resource) {
      | Some(found) => found,
      | None => {
        log::error!("no application resource for {:?}", resource);
        rep.set_code(code::INTERNAL_SERVER_ERROR);
        return HandlerResult::Error;
      },
    };

    let result = if methods.allows(req.code()) {
      let outcome = app.handle_request(&req, &mut rep);
      finish(&mut rep, outcome)
    } else {
      rep.set_code(code::METHOD_NOT_ALLOWED);
      HandlerResult::Ok
    };

    log::debug!("{}",
                logging::dispatch_summary(uri, &req, rep.code()).as_str());
    result
  }

  fn on_notify(&self,
               resource: E::Resource,
               observer: &E::Observer,
               response: &mut E::Message)
               -> HandlerResult {
    let mut rep = Response::new(response);

    let (uri, app, _) = match self.resolve(resource) {
      | Some(found) => found,
      | None => {
        log::error!("no application resource to notify for {:?}", resource);
        rep.set_code(code::INTERNAL_SERVER_ERROR);
        return HandlerResult::Error;
      },
    };

    let outcome = app.handle_notify(&ObserverRef::new(observer), &mut rep);
    log::trace!("notify {} -> {}", uri, rep.code());
    finish(&mut rep, outcome)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test::{EngineMock, MockResource, MsgMock, ObserverMock, Reply};
  use crate::opt::ContentFormat;

  type Reg<'r> = Registry<Vec<Registration<'r, usize>>>;

  fn dispatch(reg: &Reg, native: usize, req: &MsgMock) -> (HandlerResult, MsgMock) {
    let mut rep = MsgMock::default();
    let r = <Reg as Handler<EngineMock>>::on_request(reg, native, req, &mut rep);
    (r, rep)
  }

  fn get() -> MsgMock {
    MsgMock { code: code::GET.0,
              ..Default::default() }
  }

  #[test]
  fn outcomes_map_to_handler_results() {
    assert_eq!(HandlerResult::from(Outcome::Ok), HandlerResult::Ok);
    assert_eq!(HandlerResult::from(Outcome::Postpone), HandlerResult::Postpone);
    assert_eq!(HandlerResult::from(Outcome::Error), HandlerResult::Error);
  }

  #[test]
  fn methods_mask() {
    let m = Methods::GET | Methods::POST;
    assert!(m.allows(code::GET.0));
    assert!(m.allows(code::POST.0));
    assert!(!m.allows(code::PUT.0));
    assert!(!Methods::ALL.allows(code::CONTENT));
    assert_eq!(Methods::ALL.bits(), 0b1111);
  }

  #[test]
  fn unknown_handle_is_internal_error() {
    let reg = Reg::new();
    let (r, rep) = dispatch(&reg, 7, &get());

    assert_eq!(r, HandlerResult::Error);
    assert_eq!(rep.code, code::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn vacated_entry_is_internal_error() {
    let app = MockResource::replying(Reply::Content);
    let mut reg = Reg::new();
    let id = reg.push(Registration::new(3, &app, "/a").unwrap()).unwrap();
    reg.get_mut(id).unwrap().methods = Methods::ALL;

    assert_eq!(reg.vacate(id), Some(3));
    assert_eq!(reg.vacate(id), None);
    assert!(reg.get(id).is_none());

    let (r, rep) = dispatch(&reg, 3, &get());
    assert_eq!(r, HandlerResult::Error);
    assert_eq!(rep.code, code::INTERNAL_SERVER_ERROR);
    assert_eq!(app.calls(), 0);
  }

  #[test]
  fn ids_survive_removal() {
    let a = MockResource::replying(Reply::Content);
    let b = MockResource::replying(Reply::Content);
    let mut reg = Reg::new();
    let id_a = reg.push(Registration::new(1, &a, "/a").unwrap()).unwrap();
    let id_b = reg.push(Registration::new(2, &b, "/b").unwrap()).unwrap();

    reg.vacate(id_a);
    assert_eq!(reg.get(id_b).map(|r| r.uri.as_str()), Some("/b"));
    assert_eq!(reg.find(2).map(|(id, _)| id), Some(id_b));
    assert_eq!(reg.iter().count(), 1);
  }

  #[test]
  fn dispatches_to_matching_resource() {
    let a = MockResource::replying(Reply::Changed);
    let b = MockResource::replying(Reply::Content);
    let mut reg = Reg::new();
    reg.push(Registration::new(10, &a, "/a").unwrap()).unwrap();
    let id = reg.push(Registration::new(20, &b, "/b").unwrap()).unwrap();
    reg.get_mut(id).unwrap().methods = Methods::GET;

    let (r, rep) = dispatch(&reg, 20, &get());
    assert_eq!(r, HandlerResult::Ok);
    assert_eq!(rep.code, code::CONTENT);
    assert_eq!((a.calls(), b.calls()), (0, 1));
  }

  #[test]
  fn method_outside_mask_is_405() {
    let a = MockResource::replying(Reply::Content);
    let mut reg = Reg::new();
    let id = reg.push(Registration::new(1, &a, "/a").unwrap()).unwrap();
    reg.get_mut(id).unwrap().methods = Methods::GET;

    let req = MsgMock { code: code::DELETE.0,
                        ..Default::default() };
    let (r, rep) = dispatch(&reg, 1, &req);
    assert_eq!(r, HandlerResult::Ok);
    assert_eq!(rep.code, code::METHOD_NOT_ALLOWED);
    assert_eq!(a.calls(), 0);
  }

  #[test]
  fn unset_code_becomes_500() {
    let a = MockResource::replying(Reply::Nothing);
    let p = MockResource::replying(Reply::Postpone);
    let mut reg = Reg::new();
    let id_a = reg.push(Registration::new(1, &a, "/a").unwrap()).unwrap();
    let id_p = reg.push(Registration::new(2, &p, "/p").unwrap()).unwrap();
    reg.get_mut(id_a).unwrap().methods = Methods::ALL;
    reg.get_mut(id_p).unwrap().methods = Methods::ALL;

    let (r, rep) = dispatch(&reg, 1, &get());
    assert_eq!(r, HandlerResult::Ok);
    assert_eq!(rep.code, code::INTERNAL_SERVER_ERROR);

    let (r, rep) = dispatch(&reg, 2, &get());
    assert_eq!(r, HandlerResult::Postpone);
    assert_eq!(rep.code, Code::EMPTY);
  }

  #[test]
  fn error_outcome_keeps_handler_code() {
    let a = MockResource::replying(Reply::BadRequest);
    let mut reg = Reg::new();
    let id = reg.push(Registration::new(1, &a, "/a").unwrap()).unwrap();
    reg.get_mut(id).unwrap().methods = Methods::ALL;

    let (r, rep) = dispatch(&reg, 1, &get());
    assert_eq!(r, HandlerResult::Error);
    assert_eq!(rep.code, code::BAD_REQUEST);
  }

  #[test]
  fn notify_defaults_to_get() {
    let a = MockResource::replying(Reply::EchoAccept);
    let mut reg = Reg::new();
    reg.push(Registration::new(1, &a, "/a").unwrap()).unwrap();

    let observer = ObserverMock::accepting(ContentFormat::Cbor);
    let mut rep = MsgMock::default();
    let r = <Reg as Handler<EngineMock>>::on_notify(&reg, 1, &observer, &mut rep);

    assert_eq!(r, HandlerResult::Ok);
    assert_eq!(rep.code, code::CONTENT);
    assert_eq!(rep.payload.as_deref(), Some(&b"60"[..]));
  }

  #[test]
  fn fixed_capacity_registry_fills_up() {
    let a = MockResource::replying(Reply::Content);
    let mut reg = Registry::<tinyvec::ArrayVec<[Registration<usize>; 1]>>::new();

    reg.push(Registration::new(1, &a, "/a").unwrap()).unwrap();
    assert!(reg.is_full());
    assert_eq!(reg.push(Registration::new(2, &a, "/b").unwrap()).unwrap_err(),
               Error::RegistryFull);
  }

  #[test]
  fn fixed_capacity_registry_reuses_vacated_slots() {
    let a = MockResource::replying(Reply::Content);
    let mut reg = Registry::<tinyvec::ArrayVec<[Registration<usize>; 2]>>::new();

    for native in 0..4 {
      let id = reg.push(Registration::new(native, &a, "/a").unwrap()).unwrap();
      assert_eq!(id, ResourceId(0));
      assert_eq!(reg.iter().count(), 1);
      assert_eq!(reg.vacate(id), Some(native));
      assert!(!reg.is_full());
    }

    let keep = reg.push(Registration::new(10, &a, "/keep").unwrap()).unwrap();
    let gone = reg.push(Registration::new(11, &a, "/gone").unwrap()).unwrap();
    assert!(reg.is_full());

    reg.vacate(keep);
    assert!(!reg.is_full());
    assert_eq!(reg.push(Registration::new(12, &a, "/new").unwrap()), Ok(keep));
    assert_eq!(reg.get(gone).map(|r| r.uri.as_str()), Some("/gone"));
    assert_eq!(reg.push(Registration::new(13, &a, "/c").unwrap()).unwrap_err(),
               Error::RegistryFull);
  }

  #[test]
  fn uri_too_long() {
    let a = MockResource::replying(Reply::Content);
    let uri = "/x".repeat(MAX_URI_LEN);
    assert_eq!(Registration::new(1, &a, &uri).unwrap_err(), Error::CreateResource);
  }
}
