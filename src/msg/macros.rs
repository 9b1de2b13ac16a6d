macro_rules! generate_getters {
  {
    $(<$($L:lifetime)*>)? for $T:ty as $self:ident {
      $(
        $(#[$meta:meta])*
        $field:ident -> $R:ty $(= $e:expr)?
      ),* $(,)?
    }
  } => {
    impl$(<$($L)*>)? $T {
      $(
        #[inline]
        $(#[$meta])*
        pub fn $field(&$self) -> $R {
          generate_getters!(@getter $self $field $($e)?)
        }
      )*
    }
  };

  (@getter $self:ident $field:ident $e:expr) => ($e);
  (@getter $self:ident $field:ident) => ($self.$field.clone());
}

#[cfg(test)]
pub(crate) fn _parse_chat(input: &str, login: &str, channel: &str) -> crate::msg::ChatMessage {
  let channel = crate::common::Channel::parse(channel).unwrap();
  match crate::msg::parse(input, login, &channel).unwrap() {
    crate::msg::ChatEvent::ChatMessage(msg) => msg,
    other => panic!("expected a chat message, got {other:?}"),
  }
}
