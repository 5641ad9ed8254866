/*!

The root stack is the fixed-capacity sequence of references the mutator is
currently holding live. It is the sole entry point for reachability: a mark
pass starts from exactly the references recorded here, so anything the
mutator cares about must sit on this stack (or hang off something that does)
when a collection begins.

The capacity is a contract, not a hint. Pushing past it fails with
`StackOverflow` rather than growing, and popping an empty stack fails with
`StackUnderflow`; both failures leave the stack exactly as it was.

*/

use crate::api::{error::VmError, object::ObjRef};

pub(crate) struct RootStack {
  slots   : Vec<ObjRef>,
  capacity: usize,
}

impl RootStack {
  pub fn with_capacity(capacity: usize) -> RootStack {
    RootStack {
      slots: Vec::with_capacity(capacity),
      capacity,
    }
  }

  /// Appends `root`, failing if the stack is at capacity.
  pub fn push(&mut self, root: ObjRef) -> Result<(), VmError> {
    if self.slots.len() == self.capacity {
      return Err(VmError::StackOverflow);
    }
    self.slots.push(root);
    Ok(())
  }

  /// Removes and returns the most recently appended reference.
  pub fn pop(&mut self) -> Result<ObjRef, VmError> {
    self.slots.pop().ok_or(VmError::StackUnderflow)
  }

  /// Iterates the current roots without mutating the stack.
  pub fn iter(&self) -> std::slice::Iter<'_, ObjRef> {
    self.slots.iter()
  }

  pub fn clear(&mut self) {
    self.slots.clear();
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.slots.len()
  }

  #[inline(always)]
  pub fn is_full(&self) -> bool {
    self.slots.len() == self.capacity
  }

  #[inline(always)]
  pub fn capacity(&self) -> usize {
    self.capacity
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::error::VmError;

  fn root(index: u32) -> ObjRef {
    ObjRef { index, generation: 0 }
  }

  #[test]
  fn push_pop_is_lifo() {
    let mut stack = RootStack::with_capacity(4);
    stack.push(root(0)).unwrap();
    stack.push(root(1)).unwrap();
    assert_eq!(stack.pop().unwrap(), root(1));
    assert_eq!(stack.pop().unwrap(), root(0));
  }

  #[test]
  fn overflow_leaves_stack_unmodified() {
    let mut stack = RootStack::with_capacity(2);
    stack.push(root(0)).unwrap();
    stack.push(root(1)).unwrap();

    assert_eq!(stack.push(root(2)), Err(VmError::StackOverflow));
    assert_eq!(stack.len(), 2);
    // The survivor is still the one pushed before the failed push.
    assert_eq!(stack.pop().unwrap(), root(1));
  }

  #[test]
  fn underflow_on_empty() {
    let mut stack = RootStack::with_capacity(2);
    assert_eq!(stack.pop(), Err(VmError::StackUnderflow));

    stack.push(root(0)).unwrap();
    stack.pop().unwrap();
    assert_eq!(stack.pop(), Err(VmError::StackUnderflow));
    assert_eq!(stack.len(), 0);
  }

  #[test]
  fn zero_capacity_rejects_every_push() {
    let mut stack = RootStack::with_capacity(0);
    assert_eq!(stack.push(root(0)), Err(VmError::StackOverflow));
  }
}
